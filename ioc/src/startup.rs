//! Startup sequencing: optional script, interactive shell, shutdown.
//!
//! The sequencer owns the process lifetime but performs no I/O itself. Every
//! side effect happens behind [`Shell`] and [`Runtime`], and none of their
//! failures are observed here: each collaborator reports and absorbs its own
//! errors.
//!
//! ```text
//! START -> [SCRIPT_EXEC] -> INTERACTIVE -> SHUTDOWN -> TERMINATED
//! ```

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::exit_codes;

/// Opaque reference to a startup script, forwarded verbatim to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef(OsString);

impl ScriptRef {
    pub fn new(raw: impl Into<OsString>) -> Self {
        Self(raw.into())
    }

    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<OsString> for ScriptRef {
    fn from(raw: OsString) -> Self {
        Self(raw)
    }
}

impl From<&str> for ScriptRef {
    fn from(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

/// Host command interpreter.
pub trait Shell {
    /// Run every command in `script`. Returns once the script has finished;
    /// any failure is handled inside the shell.
    fn execute_script(&mut self, script: &ScriptRef);

    /// Read and run operator commands until end of input or `exit`.
    fn run_interactive(&mut self);
}

/// Host runtime that owns process-wide resources.
pub trait Runtime {
    /// Release runtime resources and end the process with `status`.
    ///
    /// Production runtimes do not return from this call.
    fn shutdown(&mut self, status: i32);
}

/// Pick the startup script from the argument list (program name excluded).
///
/// Only the first argument is used; the rest are ignored.
pub fn script_from_args<I>(args: I) -> Option<ScriptRef>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter().next().map(ScriptRef::from)
}

/// Drive one process lifetime through `shell` and `runtime`.
///
/// Returns [`exit_codes::OK`] if `runtime.shutdown` returns control.
pub fn run_ioc<S, R>(script: Option<&ScriptRef>, shell: &mut S, runtime: &mut R) -> i32
where
    S: Shell + ?Sized,
    R: Runtime + ?Sized,
{
    if let Some(script) = script {
        info!(script = %script, "running startup script");
        shell.execute_script(script);
    }

    debug!("entering interactive shell");
    shell.run_interactive();

    info!("interactive shell finished, shutting down");
    runtime.shutdown(exit_codes::OK);

    debug!("runtime shutdown returned");
    exit_codes::OK
}
