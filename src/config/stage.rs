//! One stage table of the declaration file.
use serde::{Deserialize, Serialize};

use crate::engine::{Base, Dependable, Id, Module, Stage};
use crate::error::ConfigError;
use crate::modules::{DeveloperTools, Package, ShellExecution, SshKeygen};

/// A stage as declared: graph fields plus the modules it groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Graph fields; the id is the stage's table name.
    #[serde(flatten)]
    pub base: Base,
    /// Command line developer tools.
    #[serde(
        default,
        rename = "xcode-select",
        skip_serializing_if = "Option::is_none"
    )]
    pub xcode_select: Option<DeveloperTools>,
    /// SSH key generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshKeygen>,
    /// Shell commands and scripts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shell: Vec<ShellExecution>,
    /// Managed packages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

impl StageConfig {
    /// Assign module identifiers and check each module's structure.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidModule`] for a shell entry without a name
    /// or anything to run, or a package without a name.
    pub fn initialize(&mut self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidModule {
            stage: self.base.id.to_string(),
            reason,
        };
        if let Some(tools) = &mut self.xcode_select {
            tools.base.id = Id::from(DeveloperTools::ID);
        }
        if let Some(ssh) = &mut self.ssh {
            ssh.base.id = Id::from(SshKeygen::ID);
        }
        for entry in &mut self.shell {
            entry.validate().map_err(invalid)?;
            entry.base.id = Id::from(entry.name.as_str());
        }
        for package in &mut self.packages {
            package.validate().map_err(invalid)?;
            package.base.id = Id::from(package.name.as_str());
        }
        Ok(())
    }
}

impl Dependable for StageConfig {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

impl Stage for StageConfig {
    fn modules(&self) -> Vec<&dyn Module> {
        let mut modules: Vec<&dyn Module> = Vec::new();
        if let Some(tools) = self.xcode_select.as_ref().filter(|t| t.enabled) {
            modules.push(tools);
        }
        if let Some(ssh) = self.ssh.as_ref().filter(|s| s.enabled) {
            modules.push(ssh);
        }
        modules.extend(self.shell.iter().map(|m| m as &dyn Module));
        modules.extend(self.packages.iter().map(|m| m as &dyn Module));
        modules
    }

    fn modules_mut(&mut self) -> Vec<&mut dyn Module> {
        let mut modules: Vec<&mut dyn Module> = Vec::new();
        if let Some(tools) = self.xcode_select.as_mut().filter(|t| t.enabled) {
            modules.push(tools);
        }
        if let Some(ssh) = self.ssh.as_mut().filter(|s| s.enabled) {
            modules.push(ssh);
        }
        modules.extend(self.shell.iter_mut().map(|m| m as &mut dyn Module));
        modules.extend(self.packages.iter_mut().map(|m| m as &mut dyn Module));
        modules
    }
}
