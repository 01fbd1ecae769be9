//! Process entry point for the Agilent 33521A IOC.
//!
//! The binary does three things in a fixed order: optionally replay a startup
//! script through the IOC shell, hand the terminal to the interactive shell,
//! then shut the runtime down. The crate is split along that seam:
//!
//! - **[`startup`]**: the sequencer and the [`startup::Shell`] /
//!   [`startup::Runtime`] traits it drives. No I/O of its own.
//! - **[`shell`]**: the command interpreter (line grammar, macros, command
//!   registry) that driver modules extend.
//! - **[`runtime`]**: process-lifetime ownership, at-exit handlers and the
//!   terminating shutdown.
//!
//! [`config`] and [`logging`] carry the ambient setup used by the binary.

pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod runtime;
pub mod shell;
pub mod startup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
