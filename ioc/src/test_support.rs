//! Test-only fakes for the startup collaborators and shell I/O.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Cursor, Write};
use std::panic::resume_unwind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::ShellConfig;
use crate::shell::{IocShell, MacroTable};
use crate::startup::{Runtime, ScriptRef, Shell};

/// One collaborator call observed by the recording fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ExecuteScript(OsString),
    RunInteractive,
    Shutdown(i32),
}

/// Call log shared between a recording shell and runtime.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }
}

/// Shell that records calls and does nothing else.
pub struct RecordingShell {
    log: CallLog,
}

impl RecordingShell {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl Shell for RecordingShell {
    fn execute_script(&mut self, script: &ScriptRef) {
        self.log
            .push(Call::ExecuteScript(script.as_os_str().to_os_string()));
    }

    fn run_interactive(&mut self) {
        self.log.push(Call::RunInteractive);
    }
}

/// Unwind payload used by [`RecordingRuntime::terminating`] in place of
/// ending the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminated(pub i32);

/// Runtime that records shutdown and either returns or unwinds.
pub struct RecordingRuntime {
    log: CallLog,
    terminates: bool,
}

impl RecordingRuntime {
    /// Runtime whose shutdown returns control to the caller.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            terminates: false,
        }
    }

    /// Runtime whose shutdown never returns: it unwinds with [`Terminated`].
    pub fn terminating(log: CallLog) -> Self {
        Self {
            log,
            terminates: true,
        }
    }
}

impl Runtime for RecordingRuntime {
    fn shutdown(&mut self, status: i32) {
        self.log.push(Call::Shutdown(status));
        if self.terminates {
            resume_unwind(Box::new(Terminated(status)));
        }
    }
}

/// In-memory writer that stays readable after being boxed into a shell.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Shell reading `input`, with default config and no macros.
pub fn test_shell(input: &str) -> (IocShell, SharedBuffer) {
    test_shell_with_config(ShellConfig::default(), input)
}

/// Shell reading raw `input` bytes, which need not be valid UTF-8.
pub fn test_shell_bytes(input: &[u8]) -> (IocShell, SharedBuffer) {
    shell_on_bytes(ShellConfig::default(), input)
}

pub fn test_shell_with_config(config: ShellConfig, input: &str) -> (IocShell, SharedBuffer) {
    shell_on_bytes(config, input.as_bytes())
}

fn shell_on_bytes(config: ShellConfig, input: &[u8]) -> (IocShell, SharedBuffer) {
    let output = SharedBuffer::new();
    let shell = IocShell::with_io(
        config,
        MacroTable::new(),
        Box::new(Cursor::new(input.to_vec())),
        Box::new(output.clone()),
    );
    (shell, output)
}

/// Temporary directory for script files.
pub fn script_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// Write a script file and return its path.
pub fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write script");
    path
}
