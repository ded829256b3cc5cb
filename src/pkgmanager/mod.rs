//! Package-manager backends and the registry packages resolve them from.
mod brew;
mod config;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use brew::{Brew, brew_defaults};
pub use config::{ManagerConfig, ManagerDefaults, validate_all};

use crate::confirm::Confirm;
use crate::error::ManagerError;
use crate::exec::Executor;
use crate::logging::Log;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    /// Homebrew.
    Brew,
}

impl ManagerKind {
    /// Name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brew => "brew",
        }
    }

    /// Default install location and invocation for this host.
    #[must_use]
    pub fn defaults(self) -> ManagerDefaults {
        match self {
            Self::Brew => brew_defaults(std::env::consts::ARCH),
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerKind {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brew" => Ok(Self::Brew),
            other => Err(ManagerError::Unsupported(other.to_string())),
        }
    }
}

/// Installs, updates and removes packages.
#[cfg_attr(test, mockall::automock)]
pub trait Manager: Send + Sync {
    /// Which manager this is.
    fn kind(&self) -> ManagerKind;

    /// Command prefix used to invoke the manager.
    fn command(&self) -> String;

    /// Whether `package` is installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the check itself could not run.
    fn exists(&self, package: &str) -> Result<bool>;

    /// Install `package`.
    ///
    /// # Errors
    ///
    /// Returns an error if installation fails.
    fn install(&self, package: &str) -> Result<()>;

    /// Upgrade `package`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upgrade fails.
    fn update(&self, package: &str) -> Result<()>;

    /// Uninstall `package`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn delete(&self, package: &str) -> Result<()>;
}

/// Configured managers, looked up by kind.
///
/// The first registration of a kind wins, and the first registration
/// flagged as default becomes the default.
#[derive(Default)]
pub struct ManagerRegistry {
    managers: Vec<Arc<dyn Manager>>,
    default: Option<ManagerKind>,
}

impl fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<ManagerKind> = self.managers.iter().map(|m| m.kind()).collect();
        f.debug_struct("ManagerRegistry")
            .field("managers", &kinds)
            .field("default", &self.default)
            .finish()
    }
}

impl ManagerRegistry {
    /// Validate `configs` and build the backends they describe.
    ///
    /// Validation may fall back to a default install path or offer to install
    /// a missing manager through `confirm`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (see [`validate_all`]) or if
    /// installing a missing manager fails.
    pub fn configure(
        configs: &[ManagerConfig],
        executor: &Arc<dyn Executor>,
        confirm: &dyn Confirm,
        log: &dyn Log,
    ) -> Result<Self> {
        let mut configs = configs.to_vec();
        validate_all(&mut configs, executor.as_ref(), confirm, log)?;

        let mut registry = Self::default();
        for config in &configs {
            let manager: Arc<dyn Manager> = match config.name.parse::<ManagerKind>()? {
                ManagerKind::Brew => Arc::new(Brew::new(config, Arc::clone(executor))),
            };
            log.info(&format!(
                "{} initialized, using cmd: {}",
                manager.kind(),
                manager.command()
            ));
            registry.register(manager, config.default);
        }
        Ok(registry)
    }

    /// Add `manager`; ignored if its kind is already registered.
    pub fn register(&mut self, manager: Arc<dyn Manager>, default: bool) {
        let kind = manager.kind();
        if self.managers.iter().any(|m| m.kind() == kind) {
            return;
        }
        if default && self.default.is_none() {
            self.default = Some(kind);
        }
        self.managers.push(manager);
    }

    /// Look up a manager by configured name.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Unsupported`] for unknown names and
    /// [`ManagerError::NotConfigured`] when the manager was not registered.
    pub fn provide(&self, name: &str) -> Result<Arc<dyn Manager>, ManagerError> {
        let kind: ManagerKind = name.parse()?;
        self.managers
            .iter()
            .find(|m| m.kind() == kind)
            .map(Arc::clone)
            .ok_or_else(|| ManagerError::NotConfigured(name.to_string()))
    }

    /// The default manager.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NoDefault`] if no default was registered.
    pub fn default_manager(&self) -> Result<Arc<dyn Manager>, ManagerError> {
        let kind = self.default.ok_or(ManagerError::NoDefault)?;
        self.provide(kind.as_str())
    }
}
