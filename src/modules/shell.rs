//! Run a command or a script through the user's shell.
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::engine::{ApplyError, Base, Change, Context, Dependable, Module};
use crate::exec::Shell;

/// One entry of a stage's `shell` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellExecution {
    /// Graph fields; the id is taken from [`name`](Self::name).
    #[serde(flatten)]
    pub base: Base,
    /// Module name, used as its identifier.
    #[serde(default)]
    pub name: String,
    /// Command line passed to `<shell> -c`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cmd: String,
    /// Script path passed to `<shell>`; takes precedence over `cmd`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// Capture output instead of attaching to the terminal.
    #[serde(default)]
    pub silent: bool,
    /// Abort the run if this fails.
    #[serde(default)]
    pub mandatory: bool,
}

impl ShellExecution {
    /// Check that the entry names itself and has something to run.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("shell execution must have a name".to_string());
        }
        if self.cmd.is_empty() && self.file.is_empty() {
            return Err(format!(
                "shell execution '{}' must have a cmd or a file",
                self.name
            ));
        }
        Ok(())
    }

    fn meta(&self) -> String {
        if self.file.is_empty() {
            format!("mode: cmd; silent: {}; cmd: '{}'", self.silent, self.cmd)
        } else {
            format!("mode: file; silent: {}; path: '{}'", self.silent, self.file)
        }
    }
}

impl Dependable for ShellExecution {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl Module for ShellExecution {
    fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn apply(&self, ctx: &Context) -> Result<Change, ApplyError> {
        let meta = self.meta();
        let shell = Shell::detect(ctx.executor.as_ref());
        ctx.log
            .debug(&format!("{}: running through {}", self.name, shell.program()));
        let result = if self.file.is_empty() {
            shell
                .exec(&self.cmd, self.silent)
                .context("couldn't exec command")
        } else {
            shell
                .script(&self.file, self.silent)
                .context("couldn't exec script")
        };
        match result {
            Ok(()) => Ok(Change::applied(meta)),
            Err(e) => Err(ApplyError::new(meta, e)),
        }
    }
}
