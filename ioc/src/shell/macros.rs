//! `$(NAME)` / `${NAME}` substitution for shell lines.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

static MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:\(([A-Za-z_][A-Za-z0-9_.]*)(?:=([^)]*))?\)|\{([A-Za-z_][A-Za-z0-9_.]*)(?:=([^}]*))?\})",
    )
    .unwrap()
});

/// Named values available to `$(NAME)` references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    values: BTreeMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the process environment. Non-UTF-8 entries are skipped.
    pub fn from_env() -> Self {
        let values = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Substitute every macro reference in `line`.
    ///
    /// `$(NAME=default)` falls back to `default`. An undefined reference with
    /// no default is left as written. Substituted text is not rescanned.
    pub fn expand(&self, line: &str) -> String {
        MACRO_RE
            .replace_all(line, |caps: &Captures<'_>| {
                let name = caps.get(1).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                let default = caps.get(2).or_else(|| caps.get(4));
                match (self.get(name), default) {
                    (Some(value), _) => value.to_string(),
                    (None, Some(default)) => default.as_str().to_string(),
                    (None, None) => {
                        warn!(macro_name = name, "macro is not defined");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}
