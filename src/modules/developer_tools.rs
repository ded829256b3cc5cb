//! Apple command line developer tools (`xcode-select`).
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::engine::{ApplyError, Base, Change, Context, Dependable, Module};

const META: &str = "install";

/// A stage's `xcode-select` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperTools {
    /// Graph fields; the id is always `xcode-select`.
    #[serde(flatten)]
    pub base: Base,
    /// Include the module in its stage.
    #[serde(default)]
    pub enabled: bool,
    /// Abort the run if installation fails.
    #[serde(default)]
    pub mandatory: bool,
}

impl DeveloperTools {
    /// Identifier every developer-tools module carries.
    pub const ID: &'static str = "xcode-select";
}

impl Dependable for DeveloperTools {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl Module for DeveloperTools {
    fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn apply(&self, ctx: &Context) -> Result<Change, ApplyError> {
        let installed = ctx
            .executor
            .run_unchecked("xcode-select", &["-p"])
            .context("failed checking if xcode-select is installed")
            .map_err(|e| ApplyError::new(META, e))?;
        if installed.success && installed.stdout.to_lowercase().contains("developer") {
            return Ok(Change::unchanged(META));
        }
        ctx.executor
            .run_interactive("xcode-select", &["--install"])
            .context("failed installing xcode-select")
            .map_err(|e| ApplyError::new(META, e))?;
        Ok(Change::applied(META))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::confirm::AssumeYes;
    use crate::exec::Executor;
    use crate::exec::test_helpers::MockExecutor;
    use crate::logging::test_helpers::MemoryLog;

    fn apply(executor: &Arc<MockExecutor>) -> Result<Change, ApplyError> {
        let ctx = Context::new(
            Arc::new(MemoryLog::default()),
            Arc::clone(executor) as Arc<dyn Executor>,
            Arc::new(AssumeYes),
        );
        DeveloperTools {
            enabled: true,
            ..DeveloperTools::default()
        }
        .apply(&ctx)
    }

    #[test]
    fn installed_tools_are_unchanged() {
        let executor = Arc::new(MockExecutor::ok("/Library/Developer/CommandLineTools\n"));
        let change = apply(&executor).unwrap();
        assert!(!change.changed);
        assert_eq!(change.meta, "install");
        assert_eq!(executor.calls(), ["xcode-select -p"]);
    }

    #[test]
    fn missing_tools_are_installed() {
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (false, String::new()),
            (true, String::new()),
        ]));
        assert!(apply(&executor).unwrap().changed);
        assert_eq!(
            executor.calls(),
            ["xcode-select -p", "xcode-select --install"]
        );
    }

    #[test]
    fn install_failure_keeps_meta() {
        let executor = Arc::new(MockExecutor::with_responses(vec![(false, String::new())]));
        let err = apply(&executor).unwrap_err();
        assert_eq!(err.meta, "install");
        assert!(err.to_string().contains("failed installing xcode-select"));
    }

    #[test]
    fn never_optional() {
        let tools = DeveloperTools {
            enabled: true,
            mandatory: true,
            ..DeveloperTools::default()
        };
        assert!(!tools.is_optional());
        assert!(tools.is_mandatory());
    }
}
