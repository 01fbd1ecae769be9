//! Shell configuration read from `iocsh.toml` in the working directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// File name looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "iocsh.toml";

/// Environment variable that overrides [`ShellConfig::prompt`].
pub const PROMPT_ENV: &str = "IOCSH_PS1";

/// Interactive shell configuration (TOML).
///
/// Every field is optional in the file; missing fields keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each interactive line when stdin is a terminal.
    pub prompt: String,

    /// Echo each script line to the shell output before running it.
    pub echo_commands: bool,

    /// Maximum nesting of `< script` includes.
    pub max_include_depth: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "epics> ".to_string(),
            echo_commands: true,
            max_include_depth: 16,
        }
    }
}

impl ShellConfig {
    pub fn validate(&self) -> Result<()> {
        if self.prompt.is_empty() {
            return Err(anyhow!("prompt must not be empty"));
        }
        if self.max_include_depth == 0 {
            return Err(anyhow!("max_include_depth must be > 0"));
        }
        Ok(())
    }

    /// Replace the prompt when an override is present and non-empty.
    pub fn with_prompt_override(mut self, prompt: Option<String>) -> Self {
        if let Some(prompt) = prompt.filter(|p| !p.is_empty()) {
            self.prompt = prompt;
        }
        self
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ShellConfig::default()`.
pub fn load_config(path: &Path) -> Result<ShellConfig> {
    if !path.exists() {
        return Ok(ShellConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ShellConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ShellConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "echo_commands = false\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert!(!cfg.echo_commands);
        assert_eq!(cfg.prompt, "epics> ");
        assert_eq!(cfg.max_include_depth, 16);
    }

    #[test]
    fn zero_include_depth_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "max_include_depth = 0\n").expect("write");

        let err = load_config(&path).expect_err("invalid depth");
        assert!(format!("{err:#}").contains("max_include_depth"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "prompt = \n").expect("write");

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn prompt_override_ignores_empty_values() {
        let cfg = ShellConfig::default().with_prompt_override(Some(String::new()));
        assert_eq!(cfg.prompt, "epics> ");

        let cfg = ShellConfig::default().with_prompt_override(Some("fg> ".to_string()));
        assert_eq!(cfg.prompt, "fg> ");
    }
}
