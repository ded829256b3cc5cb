//! Dependency-ordered, staged execution of provisioning modules.
//!
//! Stages and modules share one identity model ([`Dependable`]) and one
//! resolver ([`graph::resolve`]). The [`Engine`] resolves the whole
//! [`Plan`] up front, then applies modules one at a time, reporting each
//! outcome through a [`Reporter`] and aborting when a load-bearing or
//! mandatory module fails.
//!
//! # Examples
//!
//! ```
//! use furnish_cli::engine::{Base, Dependable, graph};
//!
//! #[derive(Debug)]
//! struct Unit(Base);
//!
//! impl Dependable for Unit {
//!     fn base(&self) -> &Base { &self.0 }
//!     fn base_mut(&mut self) -> &mut Base { &mut self.0 }
//! }
//!
//! let mut b = Unit(Base::new("b", &["a"]));
//! let mut a = Unit(Base::new("a", &[]));
//! let order = graph::resolve(&mut [&mut b, &mut a])?;
//! assert_eq!(order, vec![1, 0]);
//! assert!(a.is_dependency());
//! # Ok::<(), furnish_cli::error::GraphError>(())
//! ```
mod cancel;
mod context;
mod dependable;
mod events;
pub mod graph;
mod plan;
mod runner;

use std::fmt;

use thiserror::Error;

pub use cancel::CancelToken;
pub use context::Context;
pub use dependable::{Base, Dependable, Id, Version};
pub use events::{Event, Reporter};
pub use plan::{Plan, PlannedStage};
pub use runner::{
    AbortReason, Aborted, Engine, ModuleOutcome, ModuleRecord, RunReport, StageReport, StageTally,
};

/// Successful result of applying a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// `false` when the desired state was already present and nothing was done.
    pub changed: bool,
    /// Short description of what the module does, for progress output.
    pub meta: String,
}

impl Change {
    /// The module performed work.
    #[must_use]
    pub fn applied(meta: impl Into<String>) -> Self {
        Self {
            changed: true,
            meta: meta.into(),
        }
    }

    /// The module found nothing to do.
    #[must_use]
    pub fn unchanged(meta: impl Into<String>) -> Self {
        Self {
            changed: false,
            meta: meta.into(),
        }
    }
}

/// A module failed to apply.
///
/// Carries the module's meta description alongside the cause so progress
/// output can show what was attempted.
#[derive(Error, Debug)]
#[error("{source:#}")]
pub struct ApplyError {
    /// Meta description of the failed action (may be empty).
    pub meta: String,
    /// Underlying cause.
    #[source]
    pub source: anyhow::Error,
}

impl ApplyError {
    /// Wrap `source` with the given meta description.
    #[must_use]
    pub fn new(meta: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            meta: meta.into(),
            source,
        }
    }
}

/// Leaf unit of provisioning work.
///
/// Variants own their configuration and decide how to act; the engine only
/// consumes the flags and the [`apply`](Self::apply) outcome.
pub trait Module: Dependable + fmt::Debug {
    /// Ask for interactive confirmation before applying.
    fn is_optional(&self) -> bool {
        false
    }

    /// A failure aborts the run even if nothing depends on this module.
    fn is_mandatory(&self) -> bool {
        false
    }

    /// Bring the system to the module's desired state.
    ///
    /// # Errors
    ///
    /// Returns an [`ApplyError`] when the underlying action fails.
    fn apply(&self, ctx: &Context) -> Result<Change, ApplyError>;
}

/// Named, ordered group of modules.
///
/// [`modules`](Self::modules) and [`modules_mut`](Self::modules_mut) must
/// yield the same modules in the same order; that order is the resolver's
/// tie-break.
pub trait Stage: Dependable + fmt::Debug {
    /// The stage's modules, in declaration order.
    fn modules(&self) -> Vec<&dyn Module>;

    /// Mutable access to the stage's modules, in declaration order.
    fn modules_mut(&mut self) -> Vec<&mut dyn Module>;
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn change_constructors() {
        assert!(Change::applied("m").changed);
        assert!(!Change::unchanged("m").changed);
        assert_eq!(Change::unchanged("meta").meta, "meta");
    }

    #[test]
    fn apply_error_displays_cause_chain() {
        let cause = anyhow::anyhow!("exit 1").context("couldn't exec command");
        let err = ApplyError::new("mode: cmd", cause);
        assert_eq!(err.to_string(), "couldn't exec command: exit 1");
        assert_eq!(err.meta, "mode: cmd");
    }
}
