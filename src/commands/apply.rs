//! Command: apply every stage of the declaration.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Declaration;
use crate::confirm::{AssumeYes, Confirm, StdinConfirm};
use crate::engine::{AbortReason, Aborted, CancelToken, Context, Engine, RunReport};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, ProgressReporter, print_summary};
use crate::pkgmanager::ManagerRegistry;

/// Run the apply command.
///
/// Installs a Ctrl-C handler that cancels the run before the next module.
///
/// # Errors
///
/// Returns an error if the declaration cannot be loaded, package managers
/// cannot be configured, or the run aborts.
pub fn run(global: &GlobalOpts, log: Arc<dyn Log>) -> Result<()> {
    let version = super::version::version();
    log.info(&format!("furnish {version}"));

    let cancel = CancelToken::new();
    let handler = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler.cancel()) {
        log.warn(&format!("couldn't install interrupt handler: {e}"));
    }

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let confirm: Arc<dyn Confirm> = if global.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(StdinConfirm::stdin())
    };

    let mut declaration = super::load_declaration(&global.config, log.as_ref())?;
    let ctx = Context::new(log, executor, confirm).with_cancel(cancel);
    execute(&mut declaration, ctx).map(drop)
}

/// Configure package managers when needed, then apply every stage.
///
/// Progress and the final summary are logged through `ctx.log`. A run that
/// completes with absorbed module failures is still `Ok`.
///
/// # Errors
///
/// Returns an error if package-manager configuration fails, or an
/// [`Aborted`] if the run stops early.
pub fn execute(declaration: &mut Declaration, mut ctx: Context) -> Result<RunReport> {
    let log = Arc::clone(&ctx.log);

    if declaration.has_packages() {
        log.stage("Configuring package managers");
        let managers = ManagerRegistry::configure(
            &declaration.global.package_managers,
            &ctx.executor,
            ctx.confirm.as_ref(),
            log.as_ref(),
        )?;
        ctx = ctx.with_managers(managers);
    }

    let reporter = ProgressReporter::new(log.as_ref());
    match Engine::new(&ctx, &reporter).run(&mut declaration.stages) {
        Ok(report) => {
            print_summary(log.as_ref(), &report);
            let failed = report.totals().failed;
            if failed > 0 {
                log.warn(&format!("{failed} module(s) failed; see above"));
            }
            Ok(report)
        }
        Err(aborted) => {
            print_summary(log.as_ref(), &aborted.report);
            log.error(&format!("[fatal] {}", fatal_hint(&aborted)));
            Err(aborted.into())
        }
    }
}

/// One-line explanation of why the run stopped.
fn fatal_hint(aborted: &Aborted) -> String {
    match &aborted.reason {
        AbortReason::Graph(e) => format!("invalid dependency graph, nothing was applied: {e}"),
        AbortReason::FailedMandatory { module, .. } => {
            format!("failed module '{module}' is mandatory. aborting")
        }
        AbortReason::FailedDependency {
            module, dependants, ..
        } => {
            let names: Vec<&str> = dependants.iter().map(crate::engine::Id::as_str).collect();
            format!(
                "failed module '{module}' is a dependency for {}. aborting",
                names.join(", ")
            )
        }
        AbortReason::Cancelled { next, .. } => format!("interrupted before '{next}'"),
    }
}
