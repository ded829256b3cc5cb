//! Command: print version information.
use std::io::{self, Write};

/// Build version: `FURNISH_VERSION` from the build script, else the crate version.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("FURNISH_VERSION") {
        Some(v) => v,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Write `furnish <version>` to `out`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn run(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "furnish {}", version())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn prints_name_and_version() {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("furnish "));
        assert!(text.trim_end().ends_with(version()));
    }
}
