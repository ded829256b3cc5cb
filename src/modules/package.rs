//! Packages installed, upgraded or removed through a package manager.
use std::fmt;
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::engine::{ApplyError, Base, Change, Context, Dependable, Module};
use crate::pkgmanager::Manager;

/// What to do with a package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applier {
    /// Install when absent.
    #[default]
    Install,
    /// Upgrade when present.
    Update,
    /// Uninstall when present.
    Delete,
}

impl Applier {
    /// Whether the package must already be installed for the action to run.
    const fn needs_present(self) -> bool {
        !matches!(self, Self::Install)
    }
}

impl fmt::Display for Applier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// One entry of a stage's `packages` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Graph fields; the id is taken from [`name`](Self::name).
    #[serde(flatten)]
    pub base: Base,
    /// Package name as the manager knows it.
    #[serde(default)]
    pub name: String,
    /// Action to take.
    #[serde(default)]
    pub applier: Applier,
    /// Manager to use; the default manager when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    /// Ask before applying.
    #[serde(default)]
    pub optional: bool,
    /// Abort the run if this fails.
    #[serde(default)]
    pub mandatory: bool,
}

impl Package {
    /// Check that the entry names a package.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("package must have a name".to_string());
        }
        Ok(())
    }

    fn manager(&self, ctx: &Context) -> anyhow::Result<Arc<dyn Manager>> {
        match &self.manager {
            Some(name) => ctx
                .managers
                .provide(name)
                .context("couldn't provide set manager"),
            None => ctx
                .managers
                .default_manager()
                .context("couldn't provide default manager"),
        }
    }

    fn act(&self, manager: &dyn Manager) -> anyhow::Result<bool> {
        let present = manager
            .exists(&self.name)
            .context("couldn't check if package exists")?;
        if present != self.applier.needs_present() {
            return Ok(false);
        }
        match self.applier {
            Applier::Install => manager.install(&self.name),
            Applier::Update => manager.update(&self.name),
            Applier::Delete => manager.delete(&self.name),
        }
        .with_context(|| format!("couldn't {} package", self.applier))?;
        Ok(true)
    }
}

impl Dependable for Package {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl Module for Package {
    fn is_optional(&self) -> bool {
        self.optional
    }

    fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    fn apply(&self, ctx: &Context) -> Result<Change, ApplyError> {
        let manager = self.manager(ctx).map_err(|e| ApplyError::new("", e))?;
        let meta = format!("applier: {}; manager: {}", self.applier, manager.kind());
        match self.act(manager.as_ref()) {
            Ok(true) => Ok(Change::applied(meta)),
            Ok(false) => Ok(Change::unchanged(meta)),
            Err(e) => Err(ApplyError::new(meta, e)),
        }
    }
}
