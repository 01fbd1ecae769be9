//! Commands contributed by driver and database modules.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use tracing::debug;

type Handler = Box<dyn Fn(&[String], &mut dyn Write) -> Result<()>>;

/// A registered command.
pub struct CommandEntry {
    name: String,
    usage: String,
    handler: Handler,
}

impl CommandEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Run the handler with `args` (command name excluded).
    pub fn call(&self, args: &[String], out: &mut dyn Write) -> Result<()> {
        (self.handler)(args, out)
    }
}

/// Name-ordered set of commands. Registering an existing name replaces it.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, usage: &str, handler: F)
    where
        F: Fn(&[String], &mut dyn Write) -> Result<()> + 'static,
    {
        let entry = CommandEntry {
            name: name.to_string(),
            usage: usage.to_string(),
            handler: Box::new(handler),
        };
        if self.commands.insert(name.to_string(), entry).is_some() {
            debug!(command = name, "command re-registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
