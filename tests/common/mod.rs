// Shared helpers for integration tests.
//
// Provides a temporary workspace for declaration files and marker output, an
// in-memory logger, and a scripted confirmation prompt so each test can drive
// the public API without touching the terminal.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use furnish_cli::confirm::Confirm;
use furnish_cli::engine::Context;
use furnish_cli::exec::SystemExecutor;
use furnish_cli::logging::Log;

/// Records every message as `"<level>: <msg>"`.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    /// All recorded lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("log mutex").clone()
    }

    /// Whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    fn push(&self, level: &str, msg: &str) {
        self.lines
            .lock()
            .expect("log mutex")
            .push(format!("{level}: {msg}"));
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
}

/// Confirmation prompt with a fixed answer that remembers what it was asked.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    /// Answer every prompt with `answer`.
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("confirm mutex").clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn ask_yes_no(&self, prompt: &str, _affirmative: &str) -> bool {
        self.asked
            .lock()
            .expect("confirm mutex")
            .push(prompt.to_string());
        self.answer
    }
}

/// A temporary directory holding a declaration and whatever its modules write.
pub struct Workspace {
    /// Backing directory, removed on drop.
    pub dir: tempfile::TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Absolute path of `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `furnish.toml`, replacing every `{dir}` with the workspace path.
    pub fn declare(&self, text: &str) -> PathBuf {
        let path = self.path("furnish.toml");
        let text = text.replace("{dir}", &self.dir.path().to_string_lossy());
        std::fs::write(&path, text).expect("write declaration");
        path
    }

    /// Lines appended to `order.txt` by the declared modules.
    pub fn order(&self) -> Vec<String> {
        std::fs::read_to_string(self.path("order.txt"))
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// A shell entry appending `name` to the workspace's `order.txt`.
pub fn recording_shell(name: &str, dependencies: &[&str]) -> String {
    let deps: Vec<String> = dependencies.iter().map(|d| format!("\"{d}\"")).collect();
    format!(
        "name = \"{name}\"\ncmd = \"echo {name} >> {{dir}}/order.txt\"\nsilent = true\ndependencies = [{}]\n",
        deps.join(", ")
    )
}

/// A context running real commands with the given log and confirmation.
pub fn context(log: &Arc<RecordingLog>, confirm: &Arc<ScriptedConfirm>) -> Context {
    Context::new(
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(SystemExecutor),
        Arc::clone(confirm) as Arc<dyn Confirm>,
    )
}
