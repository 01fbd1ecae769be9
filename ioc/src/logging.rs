//! Diagnostic tracing for the IOC process.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG`, output to stderr.
//!   Never mixed into the shell's own output.
//!
//! - **Shell output (`shell`)**: echoed script lines, command output and
//!   command errors, written to stdout the way an operator expects to see them.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber for the IOC process.
///
/// The filter comes from `RUST_LOG` and is `warn` when unset, so a healthy
/// boot prints nothing besides the shell's own output.
///
/// # Example
/// Trace each script line, macro lookup and command dispatch while booting:
/// ```bash
/// RUST_LOG=ioc::shell=debug agilent33521a-ioc st.cmd
/// ```
/// `ioc::startup` and `ioc::runtime` log the boot phases and exit handlers at
/// `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
