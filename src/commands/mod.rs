//! Top-level subcommand orchestration.
pub mod apply;
pub mod debug;
pub mod version;

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::config::Declaration;
use crate::engine::Dependable;
use crate::logging::Log;

/// Load the declaration at `path` and initialize it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a module is
/// structurally invalid.
pub fn load_declaration(path: &Path, log: &dyn Log) -> Result<Declaration> {
    log.stage("Loading declaration");
    let mut declaration = Declaration::load(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    declaration.initialize().context("initializing declaration")?;
    for stage in &declaration.stages {
        log.debug(&format!("initialized stage '{}'", stage.id()));
    }
    log.info(&format!(
        "loaded {} stages, {} modules from {}",
        declaration.stages.len(),
        declaration.module_count(),
        path.display()
    ));
    Ok(declaration)
}
