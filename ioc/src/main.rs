//! Agilent 33521A function generator IOC.
//!
//! Runs the optional startup script, then the interactive IOC shell, then
//! shuts the runtime down.

use std::path::Path;
use std::process::ExitCode;

use ioc::config::{CONFIG_FILE, PROMPT_ENV, ShellConfig, load_config};
use ioc::logging;
use ioc::runtime::ProcessRuntime;
use ioc::shell::IocShell;
use ioc::startup::{run_ioc, script_from_args};
use tracing::{debug, warn};

fn main() -> ExitCode {
    logging::init();
    // Arguments are forwarded untouched: `--` and `-h` name scripts like any other word.
    let args: Vec<_> = std::env::args_os().skip(1).collect();
    if args.len() > 1 {
        debug!(count = args.len() - 1, "ignoring arguments after the startup script");
    }

    let mut shell = IocShell::new(shell_config(Path::new(CONFIG_FILE)));
    let mut runtime = ProcessRuntime::new();
    let script = script_from_args(args);

    let status = run_ioc(script.as_ref(), &mut shell, &mut runtime);
    ExitCode::from(u8::try_from(status).unwrap_or(1))
}

/// Load the shell config, falling back to defaults so startup never aborts.
fn shell_config(path: &Path) -> ShellConfig {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            warn!(err = %format!("{err:#}"), "using default shell config");
            ShellConfig::default()
        }
    };
    config.with_prompt_override(std::env::var(PROMPT_ENV).ok())
}
