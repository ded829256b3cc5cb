//! Process execution behind an injectable [`Executor`].
use anyhow::{Context as _, Result, bail};
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs.
///
/// Modules and package managers only touch the system through this trait so
/// tests can substitute a scripted implementation.
pub trait Executor: Send + Sync {
    /// Run a program with captured output. Fails if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a program with captured output, allowing a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a program attached to the terminal (inherited stdio).
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<()>;

    /// Check whether a program is on `PATH`, or an absolute path is executable.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        if !status.success() {
            bail!("{program} failed (exit {})", status.code().unwrap_or(-1));
        }
        Ok(())
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// The shell commands and scripts run through: zsh when available, bash otherwise.
#[derive(Clone, Copy)]
pub struct Shell<'a> {
    executor: &'a dyn Executor,
    program: &'static str,
}

impl std::fmt::Debug for Shell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl<'a> Shell<'a> {
    /// Pick the shell available through `executor`.
    #[must_use]
    pub fn detect(executor: &'a dyn Executor) -> Self {
        let program = if executor.which("zsh") { "zsh" } else { "bash" };
        Self { executor, program }
    }

    /// Shell program name.
    #[must_use]
    pub const fn program(&self) -> &'static str {
        self.program
    }

    /// Run `cmd` via `<shell> -c`, attached to the terminal unless `silent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn exec(&self, cmd: &str, silent: bool) -> Result<()> {
        if silent {
            self.executor.run(self.program, &["-c", cmd]).map(drop)
        } else {
            self.executor.run_interactive(self.program, &["-c", cmd])
        }
    }

    /// Run `cmd` via `<shell> -c` and report whether it exited zero.
    ///
    /// # Errors
    ///
    /// Returns an error only if the shell cannot be started.
    pub fn succeeds(&self, cmd: &str) -> Result<bool> {
        Ok(self
            .executor
            .run_unchecked(self.program, &["-c", cmd])?
            .success)
    }

    /// Run the script at `path`, attached to the terminal unless `silent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the script fails.
    pub fn script(&self, path: &str, silent: bool) -> Result<()> {
        if silent {
            self.executor.run(self.program, &[path]).map(drop)
        } else {
            self.executor.run_interactive(self.program, &[path])
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_helpers::MockExecutor;
    use super::*;

    // -----------------------------------------------------------------------
    // SystemExecutor
    // -----------------------------------------------------------------------

    #[test]
    fn run_echo() {
        let result = SystemExecutor.run("echo", &["hello"]).unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_failure() {
        let result = SystemExecutor.run("false", &[]);
        assert!(result.is_err(), "non-zero exit should produce an error");
    }

    #[test]
    fn run_unchecked_failure() {
        let result = SystemExecutor.run_unchecked("false", &[]).unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
    }

    #[test]
    fn run_missing_program() {
        let result = SystemExecutor.run_unchecked("this-program-does-not-exist-12345", &[]);
        assert!(result.is_err(), "missing program should fail to start");
    }

    #[test]
    fn which_finds_known_program() {
        assert!(SystemExecutor.which("echo"), "echo should be found on Unix");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }

    #[test]
    fn which_accepts_absolute_path() {
        let echo = which::which("echo").unwrap();
        assert!(SystemExecutor.which(&echo.to_string_lossy()));
    }

    // -----------------------------------------------------------------------
    // Shell
    // -----------------------------------------------------------------------

    #[test]
    fn shell_prefers_zsh() {
        let executor = MockExecutor::with_responses(vec![]).with_which(true);
        assert_eq!(Shell::detect(&executor).program(), "zsh");
    }

    #[test]
    fn shell_falls_back_to_bash() {
        let executor = MockExecutor::with_responses(vec![]);
        assert_eq!(Shell::detect(&executor).program(), "bash");
    }

    #[test]
    fn shell_exec_passes_command_to_dash_c() {
        let executor = MockExecutor::ok("");
        Shell::detect(&executor).exec("echo hi", true).unwrap();
        assert_eq!(executor.calls(), ["bash -c echo hi"]);
    }

    #[test]
    fn shell_script_runs_path() {
        let executor = MockExecutor::ok("");
        Shell::detect(&executor).script("setup.sh", false).unwrap();
        assert_eq!(executor.calls(), ["bash setup.sh"]);
    }

    #[test]
    fn shell_succeeds_reports_exit_status() {
        let executor = MockExecutor::with_responses(vec![(false, String::new())]);
        assert!(!Shell::detect(&executor).succeeds("brew list git").unwrap());
    }
}
