//! The IOC command shell.
//!
//! Lines are handled the same way whether they come from a script or from the
//! operator: comments are skipped, macros are expanded, the line is split into
//! words and the first word picks a command. Errors are printed to the shell
//! output and the shell moves on to the next line; only `exit` stops reading.
//!
//! The built-in commands cover the shell's own control surface. Everything
//! else arrives through [`CommandRegistry`].

pub mod lexer;
pub mod macros;
pub mod registry;

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::mem;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, error, instrument, warn};

use crate::config::ShellConfig;
use crate::shell::lexer::{is_comment, is_silent_comment, tokenize};
use crate::startup::{ScriptRef, Shell};

pub use crate::shell::macros::MacroTable;
pub use crate::shell::registry::{CommandEntry, CommandRegistry};

/// Built-in commands and their usage lines.
const BUILTINS: [(&str, &str); 5] = [
    ("<", "< script"),
    ("epicsEnvSet", "epicsEnvSet name value"),
    ("epicsEnvShow", "epicsEnvShow [name]"),
    ("exit", "exit"),
    ("help", "help [command ...]"),
];

/// Whether to keep reading lines from the current source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Line-oriented command interpreter.
pub struct IocShell {
    config: ShellConfig,
    macros: MacroTable,
    registry: CommandRegistry,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    show_prompt: bool,
}

impl IocShell {
    /// Shell on the process stdin/stdout, with macros seeded from the environment.
    ///
    /// The prompt is shown only when stdin is a terminal.
    pub fn new(config: ShellConfig) -> Self {
        let stdin = io::stdin();
        let show_prompt = stdin.is_terminal();
        Self {
            config,
            macros: MacroTable::from_env(),
            registry: CommandRegistry::new(),
            input: Box::new(stdin.lock()),
            output: Box::new(io::stdout()),
            show_prompt,
        }
    }

    /// Shell on explicit streams. The prompt is off until [`Self::show_prompt`].
    pub fn with_io(
        config: ShellConfig,
        macros: MacroTable,
        input: Box<dyn BufRead>,
        output: Box<dyn Write>,
    ) -> Self {
        Self {
            config,
            macros,
            registry: CommandRegistry::new(),
            input,
            output,
            show_prompt: false,
        }
    }

    pub fn show_prompt(mut self, show: bool) -> Self {
        self.show_prompt = show;
        self
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn macros_mut(&mut self) -> &mut MacroTable {
        &mut self.macros
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Run the script at `path`, nested `depth` includes deep.
    fn include(&mut self, path: &Path, depth: usize) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), err = %err, "cannot open script");
                self.report(format_args!("Can't open {}: {err}", path.display()));
                return;
            }
        };
        if let Err(err) = self.run_script_lines(BufReader::new(file), depth) {
            error!(path = %path.display(), err = %format!("{err:#}"), "script aborted");
            self.report(format_args!("{}: {err:#}", path.display()));
        }
    }

    #[instrument(skip_all, fields(depth = depth))]
    fn run_script_lines<R: BufRead>(&mut self, mut reader: R, depth: usize) -> Result<()> {
        let mut buf = Vec::new();
        while let Some(line) =
            read_line_lossy(&mut reader, &mut buf).context("read script line")?
        {
            if self.config.echo_commands && !is_silent_comment(&line) {
                self.report(&line);
            }
            if self.execute_line(&line, depth) == Flow::Exit {
                debug!("exit requested by script");
                break;
            }
        }
        Ok(())
    }

    fn execute_line(&mut self, line: &str, depth: usize) -> Flow {
        if is_comment(line) {
            return Flow::Continue;
        }
        let expanded = self.macros.expand(line.trim());
        let words = match tokenize(&expanded) {
            Ok(words) => words,
            Err(err) => {
                self.report(format_args!("Parse error: {err}"));
                return Flow::Continue;
            }
        };
        let Some((name, args)) = words.split_first() else {
            return Flow::Continue;
        };

        if let Some(attached) = name.strip_prefix('<') {
            let target = if attached.is_empty() {
                args.first().map(String::as_str)
            } else {
                Some(attached)
            };
            self.include_nested(target, depth);
            return Flow::Continue;
        }

        self.dispatch(name, args)
    }

    fn include_nested(&mut self, target: Option<&str>, depth: usize) {
        let Some(target) = target else {
            self.report("Usage: < script");
            return;
        };
        let next = depth + 1;
        let limit = self.config.max_include_depth;
        if next > limit {
            warn!(script = target, depth, "include depth limit reached");
            self.report(format_args!("Can't include {target}: nesting deeper than {limit}"));
            return;
        }
        self.include(Path::new(target), next);
    }

    fn dispatch(&mut self, name: &str, args: &[String]) -> Flow {
        match name {
            "exit" => return Flow::Exit,
            "help" => self.help(args),
            "epicsEnvSet" => self.env_set(args),
            "epicsEnvShow" => self.env_show(args),
            _ => {
                let result = match self.registry.get(name) {
                    Some(entry) => entry.call(args, self.output.as_mut()),
                    None => {
                        self.report(format_args!("Command {name} not found."));
                        return Flow::Continue;
                    }
                };
                if let Err(err) = result {
                    debug!(command = name, err = %format!("{err:#}"), "command failed");
                    self.report(format_args!("{name}: {err:#}"));
                }
            }
        }
        Flow::Continue
    }

    fn usage(&self, name: &str) -> Option<String> {
        BUILTINS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, usage)| (*usage).to_string())
            .or_else(|| self.registry.get(name).map(|e| e.usage().to_string()))
    }

    fn help(&mut self, args: &[String]) {
        if args.is_empty() {
            self.report("Type 'help <command>' to see the arguments of <command>.");
            let mut names: Vec<String> = BUILTINS.iter().map(|(n, _)| (*n).to_string()).collect();
            names.extend(self.registry.iter().map(|e| e.name().to_string()));
            names.sort();
            names.dedup();
            for name in names {
                self.report(name);
            }
            return;
        }
        for name in args {
            match self.usage(name) {
                Some(usage) => self.report(usage),
                None => self.report(format_args!("Command {name} not found.")),
            }
        }
    }

    fn env_set(&mut self, args: &[String]) {
        match args {
            [name, value] => {
                debug!(macro_name = %name, value = %value, "macro set");
                self.macros.set(name.as_str(), value.as_str());
            }
            _ => self.report("Usage: epicsEnvSet name value"),
        }
    }

    fn env_show(&mut self, args: &[String]) {
        match args {
            [] => {
                let lines: Vec<String> = self
                    .macros
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                for line in lines {
                    self.report(line);
                }
            }
            [name, ..] => match self.macros.get(name).map(str::to_string) {
                Some(value) => self.report(format_args!("{name}={value}")),
                None => self.report(format_args!("{name} is not defined")),
            },
        }
    }

    /// Write one line of shell output.
    fn report(&mut self, line: impl Display) {
        if let Err(err) = writeln!(self.output, "{line}") {
            warn!(err = %err, "failed to write shell output");
        }
    }

    fn prompt(&mut self) {
        if !self.show_prompt {
            return;
        }
        let result = write!(self.output, "{}", self.config.prompt)
            .and_then(|()| self.output.flush());
        if let Err(err) = result {
            warn!(err = %err, "failed to write prompt");
        }
    }
}

/// Read one line without its terminator. Invalid UTF-8 is replaced rather
/// than rejected. Returns `None` at end of input.
fn read_line_lossy<R: BufRead + ?Sized>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let line = match String::from_utf8(mem::take(buf)) {
        Ok(line) => line,
        Err(err) => {
            warn!("input line is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

impl Shell for IocShell {
    fn execute_script(&mut self, script: &ScriptRef) {
        self.include(script.as_path(), 0);
        if let Err(err) = self.output.flush() {
            warn!(err = %err, "failed to flush shell output");
        }
    }

    fn run_interactive(&mut self) {
        let mut input = mem::replace(&mut self.input, Box::new(io::empty()));
        let mut buf = Vec::new();
        loop {
            self.prompt();
            match read_line_lossy(&mut input, &mut buf) {
                Ok(None) => {
                    debug!("end of interactive input");
                    if self.show_prompt {
                        self.report("");
                    }
                    break;
                }
                Ok(Some(line)) => {
                    if self.execute_line(&line, 0) == Flow::Exit {
                        debug!("exit requested by operator");
                        break;
                    }
                }
                Err(err) => {
                    error!(err = %err, "failed to read interactive input");
                    break;
                }
            }
        }
        self.input = input;
        if let Err(err) = self.output.flush() {
            warn!(err = %err, "failed to flush shell output");
        }
    }
}
