//! Domain-specific error types for the provisioning engine.
//!
//! Internal layers return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! GraphError   : unresolvable dependency edges, dependency cycles
//! ConfigError  : declaration file reading, parsing, structural checks
//! ManagerError : package-manager configuration and lookup
//! ```
//!
//! Module failures and run aborts live next to the engine
//! ([`crate::engine::ApplyError`], [`crate::engine::AbortReason`]).

use std::fmt;

use thiserror::Error;

use crate::engine::Id;

/// Errors raised by the dependency graph resolver.
///
/// Both variants are fatal to the sort: no ordering is produced and no
/// module is applied on a malformed graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A unit declares a dependency that is not present in its scope.
    #[error("'{unit}' depends on '{missing}', which is not defined in the same scope")]
    UnresolvedDependency {
        /// Identifier of the unit declaring the dependency.
        unit: Id,
        /// Identifier that could not be found.
        missing: Id,
    },

    /// The units listed form a dependency cycle.
    #[error("dependency cycle detected: {}", CyclePath(.units))]
    CycleDetected {
        /// Cycle participants in traversal order; the first unit closes the loop.
        units: Vec<Id>,
    },
}

/// Renders a cycle as `a -> b -> a`.
struct CyclePath<'a>(&'a [Id]);

impl fmt::Display for CyclePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.0 {
            write!(f, "{id} -> ")?;
        }
        match self.0.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

/// Errors that arise from loading the declaration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The declaration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The declaration is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A top-level stage entry is not a table.
    #[error("stage '{0}' must be a table")]
    InvalidStage(String),

    /// A module inside a stage is structurally incomplete.
    #[error("invalid module in stage '{stage}': {reason}")]
    InvalidModule {
        /// Stage that owns the module.
        stage: String,
        /// What is wrong with the module.
        reason: String,
    },
}

/// Errors that arise from package-manager configuration and lookup.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// No package manager was configured while packages need one.
    #[error("no package manager configured; at least one is required as the default")]
    NoManagers,

    /// A manager entry has no name.
    #[error("package manager entry has no name")]
    MissingName,

    /// The manager name is not one of the supported managers.
    #[error("unsupported package manager '{0}'")]
    Unsupported(String),

    /// The manager binary could not be found and was not installed.
    #[error("package manager '{name}' not found at '{path}'")]
    NotFound {
        /// Manager name.
        name: String,
        /// Path that was checked.
        path: String,
    },

    /// A package asked for the default manager but none is set.
    #[error("no default package manager set")]
    NoDefault,

    /// A package asked for a manager that is not registered.
    #[error("package manager '{0}' is not configured")]
    NotConfigured(String),
}
