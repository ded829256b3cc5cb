//! The declaration file: global settings and the stages to provision.
//!
//! Every top-level table other than `version` and `global` is a stage named
//! after its key. Stages keep file order, which the resolver uses to break
//! ties.
mod stage;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use stage::StageConfig;

use crate::engine::{Id, Stage, Version};
use crate::error::ConfigError;
use crate::pkgmanager::ManagerConfig;

/// Settings shared by all stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Global {
    /// Package managers available to package modules.
    #[serde(default, rename = "package-managers")]
    pub package_managers: Vec<ManagerConfig>,
}

/// A parsed declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Declaration format version.
    pub version: Version,
    /// Global settings.
    pub global: Global,
    /// Stages in file order.
    pub stages: Vec<StageConfig>,
}

impl Declaration {
    /// Read and parse the declaration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or any error
    /// from [`parse`](Self::parse).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse a declaration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or a schema mismatch,
    /// and [`ConfigError::InvalidStage`] for a top-level stage key that is not
    /// a table.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut declaration = Self::default();
        for (key, value) in table {
            match key.as_str() {
                "version" => declaration.version = value.try_into()?,
                "global" => declaration.global = value.try_into()?,
                _ => {
                    if !value.is_table() {
                        return Err(ConfigError::InvalidStage(key));
                    }
                    let mut stage: StageConfig = value.try_into()?;
                    stage.base.id = Id::from(key);
                    declaration.stages.push(stage);
                }
            }
        }
        Ok(declaration)
    }

    /// Assign module identifiers and validate every stage.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidModule`] found.
    pub fn initialize(&mut self) -> Result<(), ConfigError> {
        self.stages.iter_mut().try_for_each(StageConfig::initialize)
    }

    /// Whether any stage declares a package module.
    #[must_use]
    pub fn has_packages(&self) -> bool {
        self.stages.iter().any(|s| !s.packages.is_empty())
    }

    /// Number of enabled modules across all stages.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.stages.iter().map(|s| s.modules().len()).sum()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::engine::Dependable;
    use std::io::Write as _;

    const SAMPLE: &str = r#"
version = "1"

[[global.package-managers]]
name = "brew"
path = "/opt/homebrew/bin/brew"

[tools]
dependencies = ["base"]

[[tools.packages]]
name = "git"

[base]
description = "base system"

[base.xcode-select]
enabled = true
mandatory = true

[later]
"#;

    #[test]
    fn stages_keep_file_order() {
        let decl = Declaration::parse(SAMPLE).unwrap();
        let ids: Vec<&str> = decl.stages.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, ["tools", "base", "later"]);
    }

    #[test]
    fn reserved_keys_are_not_stages() {
        let decl = Declaration::parse(SAMPLE).unwrap();
        assert_eq!(decl.version.as_str(), "1");
        assert_eq!(decl.global.package_managers.len(), 1);
        assert_eq!(decl.global.package_managers[0].name, "brew");
        assert!(decl.stages.iter().all(|s| s.id().as_str() != "global"));
    }

    #[test]
    fn empty_stage_table_is_accepted() {
        let decl = Declaration::parse(SAMPLE).unwrap();
        assert!(decl.stages[2].modules().is_empty());
    }

    #[test]
    fn initialize_assigns_module_ids() {
        let mut decl = Declaration::parse(SAMPLE).unwrap();
        decl.initialize().unwrap();
        assert_eq!(decl.stages[0].packages[0].id().as_str(), "git");
        assert_eq!(decl.stages[1].modules()[0].id().as_str(), "xcode-select");
        assert_eq!(decl.module_count(), 2);
    }

    #[test]
    fn has_packages() {
        assert!(Declaration::parse(SAMPLE).unwrap().has_packages());
        assert!(!Declaration::parse("[a]\n").unwrap().has_packages());
    }

    #[test]
    fn non_table_stage_is_rejected() {
        let err = Declaration::parse("oops = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStage(key) if key == "oops"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Declaration::parse("[stage\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn schema_mismatch_is_parse_error() {
        let err = Declaration::parse("[a]\ndependencies = \"b\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let decl = Declaration::load(file.path()).unwrap();
        assert_eq!(decl.stages.len(), 3);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Declaration::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }
}
