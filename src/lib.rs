//! Declarative, dependency-ordered machine provisioning.
//!
//! A TOML declaration groups provisioning modules (shell commands, SSH key
//! generation, developer tools, packages) into named stages. Stages and the
//! modules inside each stage declare dependencies on their siblings; the
//! engine orders both levels topologically and applies modules one at a time,
//! absorbing ordinary failures and aborting when a module others depend on,
//! or a mandatory one, fails.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: parse and initialize the declaration file
//! - **[`modules`]**: the concrete module variants
//! - **[`engine`]**: dependency resolution and staged execution
//! - **[`pkgmanager`]**: package-manager backends and their registry
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `debug`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod modules;
pub mod pkgmanager;
