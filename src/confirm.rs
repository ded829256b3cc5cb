//! Interactive yes/no confirmation.
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

/// Asks the operator a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm: Send + Sync {
    /// Show `prompt` and return `true` if the answer equals `affirmative`,
    /// ignoring case and surrounding whitespace. Blocks until answered.
    fn ask_yes_no(&self, prompt: &str, affirmative: &str) -> bool;
}

/// Returns `true` if `answer` matches `affirmative`.
fn is_affirmative(answer: &str, affirmative: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(affirmative.trim())
}

/// Prompts on a writer and reads one line from a reader.
///
/// A read failure or end of input counts as a negative answer.
pub struct LineConfirm<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> std::fmt::Debug for LineConfirm<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfirm").finish_non_exhaustive()
    }
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    /// Prompt on `writer`, read answers from `reader`.
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }
}

/// [`LineConfirm`] on the process's standard streams.
pub type StdinConfirm = LineConfirm<BufReader<Stdin>, Stdout>;

impl StdinConfirm {
    /// Prompt on stdout, read from stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> Confirm for LineConfirm<R, W> {
    fn ask_yes_no(&self, prompt: &str, affirmative: &str) -> bool {
        let mut guard = self
            .io
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (reader, writer) = &mut *guard;
        if writeln!(writer, "\x1b[33m{prompt}\x1b[0m").is_err() || writer.flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&line, affirmative),
        }
    }
}

/// Answers every question affirmatively (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn ask_yes_no(&self, _prompt: &str, _affirmative: &str) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> (bool, String) {
        let confirm = LineConfirm::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let answer = confirm.ask_yes_no("Install?", "y");
        let (_, out) = confirm.io.into_inner().unwrap();
        (answer, String::from_utf8(out).unwrap())
    }

    #[test]
    fn lowercase_y_accepts() {
        assert!(ask("y\n").0);
    }

    #[test]
    fn uppercase_y_accepts() {
        assert!(ask("Y\n").0);
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert!(ask("  y  \n").0);
    }

    #[test]
    fn other_answers_decline() {
        assert!(!ask("n\n").0);
        assert!(!ask("yes\n").0);
        assert!(!ask("\n").0);
    }

    #[test]
    fn end_of_input_declines() {
        assert!(!ask("").0);
    }

    #[test]
    fn prompt_is_written() {
        let (_, out) = ask("y\n");
        assert!(out.contains("Install?"));
    }

    #[test]
    fn assume_yes_always_accepts() {
        assert!(AssumeYes.ask_yes_no("anything", "y"));
    }
}
