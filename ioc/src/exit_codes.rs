//! Stable exit codes for the IOC binary.

/// Orderly shutdown. Passed to the runtime and returned if shutdown returns.
pub const OK: i32 = 0;
