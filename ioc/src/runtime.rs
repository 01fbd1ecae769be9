//! Process-lifetime runtime: at-exit handlers and the terminating shutdown.

use std::io::{self, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error, info};

use crate::startup::Runtime;

struct ExitHandler {
    name: String,
    run: Box<dyn FnOnce()>,
}

/// Runtime that owns the process and ends it on shutdown.
#[derive(Default)]
pub struct ProcessRuntime {
    handlers: Vec<ExitHandler>,
}

impl ProcessRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` to run at shutdown. Handlers run last-registered-first.
    pub fn at_exit<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: FnOnce() + 'static,
    {
        self.handlers.push(ExitHandler {
            name: name.into(),
            run: Box::new(handler),
        });
    }

    pub fn pending_handlers(&self) -> usize {
        self.handlers.len()
    }

    /// Run and drop every registered handler. A panicking handler is logged
    /// and the remaining handlers still run. Returns how many completed.
    pub fn run_exit_handlers(&mut self) -> usize {
        let mut completed = 0;
        while let Some(handler) = self.handlers.pop() {
            debug!(handler = %handler.name, "running exit handler");
            match catch_unwind(AssertUnwindSafe(handler.run)) {
                Ok(()) => completed += 1,
                Err(_) => error!(handler = %handler.name, "exit handler panicked"),
            }
        }
        completed
    }

    /// Run exit handlers, flush standard streams and end the process.
    pub fn exit(&mut self, status: i32) -> ! {
        let registered = self.handlers.len();
        let completed = self.run_exit_handlers();
        info!(status, registered, completed, "runtime shut down");

        // Nothing can report a flush failure this late.
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(status)
    }
}

impl Runtime for ProcessRuntime {
    fn shutdown(&mut self, status: i32) {
        self.exit(status)
    }
}
