//! Package-manager configuration and its validation.
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use super::ManagerKind;
use crate::confirm::Confirm;
use crate::error::ManagerError;
use crate::exec::{Executor, Shell};
use crate::logging::Log;

/// One `[[global.package-managers]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Manager name (`brew`).
    #[serde(default)]
    pub name: String,
    /// Path to the manager binary; empty means the host default.
    #[serde(default)]
    pub path: String,
    /// Whether packages without an explicit manager use this one.
    #[serde(default)]
    pub default: bool,
    /// Command prefix, e.g. `arch -arm64`; empty means the host default.
    #[serde(default)]
    pub prefix: String,
}

/// Host defaults for a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerDefaults {
    /// Default binary location.
    pub path: &'static str,
    /// Default command prefix.
    pub prefix: &'static str,
    /// Shell command installing the manager; empty if unavailable.
    pub install_command: &'static str,
}

/// Validate every entry, filling in defaults in place.
///
/// At least one manager is required, and a lone manager is always the
/// default.
///
/// # Errors
///
/// Returns [`ManagerError::NoManagers`] for an empty list, or the first
/// per-entry failure (see [`ManagerConfig::validate`]).
pub fn validate_all(
    configs: &mut [ManagerConfig],
    executor: &dyn Executor,
    confirm: &dyn Confirm,
    log: &dyn Log,
) -> Result<()> {
    if configs.is_empty() {
        return Err(ManagerError::NoManagers.into());
    }
    if let [only] = &mut *configs {
        only.default = true;
    }
    for config in configs.iter_mut() {
        config.validate(executor, confirm, log)?;
    }
    Ok(())
}

impl ManagerConfig {
    /// Check the entry and resolve its binary path.
    ///
    /// An empty path takes the host default. If the configured binary is
    /// missing but the default one exists, the default is used. Otherwise the
    /// operator is offered an install.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::MissingName`], [`ManagerError::Unsupported`],
    /// [`ManagerError::NotFound`], or the failure of the install command.
    pub fn validate(
        &mut self,
        executor: &dyn Executor,
        confirm: &dyn Confirm,
        log: &dyn Log,
    ) -> Result<()> {
        if self.name.is_empty() {
            return Err(ManagerError::MissingName.into());
        }
        let kind: ManagerKind = self.name.parse()?;
        let defaults = kind.defaults();
        if self.path.is_empty() {
            self.path = defaults.path.to_string();
        }
        if executor.which(&self.path) {
            return Ok(());
        }

        log.warn(&format!("{} not found at '{}'", self.name, self.path));
        if executor.which(defaults.path) {
            log.info(&format!("default path found, using {}", defaults.path));
            self.path = defaults.path.to_string();
            return Ok(());
        }

        if !defaults.install_command.is_empty()
            && confirm.ask_yes_no(
                &format!(
                    "{} not found but we can install it.\nIf you wish to install {} press Y/y.",
                    capitalize(&self.name),
                    self.name
                ),
                "y",
            )
        {
            Shell::detect(executor)
                .exec(defaults.install_command, false)
                .with_context(|| format!("installing {}", self.name))?;
            self.path = defaults.path.to_string();
            return Ok(());
        }

        log.error(&format!(
            "package manager {} not found, or it's the wrong path",
            self.name
        ));
        Err(ManagerError::NotFound {
            name: self.name.clone(),
            path: self.path.clone(),
        }
        .into())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
