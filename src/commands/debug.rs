//! Command: print the declaration and its resolved order without applying it.
use std::io::Write;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Declaration;
use crate::engine::Plan;
use crate::logging::Log;

/// Run the debug command, writing the report to `out`.
///
/// # Errors
///
/// Returns an error if the declaration cannot be loaded or resolved, or if
/// writing fails.
pub fn run(global: &GlobalOpts, log: &dyn Log, out: &mut dyn Write) -> Result<()> {
    let mut declaration = super::load_declaration(&global.config, log)?;
    report(&mut declaration, out)
}

/// Resolve `declaration` and write it as JSON followed by its execution order.
///
/// Resolution fills in dependants and the stage/module hierarchy, so the JSON
/// shows the computed fields too. No module is applied.
///
/// # Errors
///
/// Returns an error if the dependency graph is invalid or writing fails.
pub fn report(declaration: &mut Declaration, out: &mut dyn Write) -> Result<()> {
    let order = Plan::resolve(&mut declaration.stages)?.order();

    let json = serde_json::to_string_pretty(declaration).context("serializing declaration")?;
    writeln!(out, "{json}")?;
    writeln!(out)?;
    writeln!(out, "execution order:")?;
    for (i, (stage, modules)) in order.iter().enumerate() {
        let modules: Vec<&str> = modules.iter().map(crate::engine::Id::as_str).collect();
        writeln!(out, "  {}. {stage}: {}", i + 1, modules.join(" -> "))?;
    }
    Ok(())
}
