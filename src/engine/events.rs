//! Progress events emitted by the engine for a presentation layer.

use super::{Id, ModuleRecord, StageTally};

/// One step of a run, in emission order.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A stage with at least one module is about to run.
    StageStarted {
        /// Stage identifier.
        stage: &'a Id,
        /// Number of modules in the stage.
        modules: usize,
    },
    /// A stage has no modules and was passed over.
    StageEmpty {
        /// Stage identifier.
        stage: &'a Id,
    },
    /// A module reached a terminal outcome.
    ModuleFinished {
        /// Owning stage.
        stage: &'a Id,
        /// One-based position of the module within the stage.
        index: usize,
        /// Number of modules in the stage.
        total: usize,
        /// Outcome details.
        record: &'a ModuleRecord,
    },
    /// Every module in a stage was attempted.
    StageFinished {
        /// Stage identifier.
        stage: &'a Id,
        /// Outcome counts.
        tally: &'a StageTally,
    },
}

/// Receives [`Event`]s as the engine produces them.
pub trait Reporter {
    /// Handle one event. Must not fail.
    fn report(&self, event: &Event<'_>);
}
