//! Console rendering of engine progress and the end-of-run summary.
use super::types::Log;
use crate::engine::{Event, ModuleOutcome, ModuleRecord, Reporter, RunReport, StageTally};

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// [`Reporter`] writing one line per module and per-stage totals to a [`Log`].
pub struct ProgressReporter<'a> {
    log: &'a dyn Log,
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

impl<'a> ProgressReporter<'a> {
    /// Report through `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }

    fn module(&self, index: usize, total: usize, record: &ModuleRecord) {
        let id = &record.id;
        match record.outcome {
            ModuleOutcome::Applied => self
                .log
                .info(&format!("{GREEN}[{index}/{total}] '{id}' applied.{RESET}")),
            ModuleOutcome::SkippedNoop => self.log.info(&format!(
                "{YELLOW}[{index}/{total}] '{id}' skipped - already applied{RESET}"
            )),
            ModuleOutcome::SkippedDeclined => self.log.info(&format!(
                "{YELLOW}[{index}/{total}] '{id}' skipped - declined{RESET}"
            )),
            ModuleOutcome::Failed => self
                .log
                .error(&format!("[{index}/{total}] '{id}' error applying module.")),
        }
        if !record.meta.is_empty() {
            self.log.info(&format!("\t{DIM}meta: [{}]{RESET}", record.meta));
        }
        if let Some(err) = &record.error {
            self.log.error(&format!("\terr: {err}"));
        }
    }

    fn tally(&self, tally: &StageTally) {
        let total = tally.total;
        if tally.applied > 0 {
            self.log.info(&format!(
                "{GREEN}[✔] applied {} of {total} modules{RESET}",
                tally.applied
            ));
        }
        if tally.skipped > 0 {
            self.log.info(&format!(
                "{YELLOW}[-] skipped {} of {total} modules{RESET}",
                tally.skipped
            ));
        }
        if tally.failed > 0 {
            self.log.info(&format!(
                "{RED}[✘] failed applying {} of {total} modules{RESET}",
                tally.failed
            ));
        }
    }
}

impl Reporter for ProgressReporter<'_> {
    fn report(&self, event: &Event<'_>) {
        match *event {
            Event::StageStarted { stage, .. } => self.log.stage(&format!("[{stage}]")),
            Event::StageEmpty { stage } => self
                .log
                .info(&format!("{YELLOW}stage '{stage}' empty, skipping{RESET}")),
            Event::ModuleFinished {
                index,
                total,
                record,
                ..
            } => self.module(index, total, record),
            Event::StageFinished { tally, .. } => self.tally(tally),
        }
    }
}

/// Log a per-stage summary of `report`, then overall totals.
pub fn print_summary(log: &dyn Log, report: &RunReport) {
    if report.stages.is_empty() {
        return;
    }
    log.stage("Summary");
    for stage in &report.stages {
        let t = stage.tally;
        let color = if t.failed > 0 { RED } else { GREEN };
        log.info(&format!(
            "{color}{}{RESET}: {} applied, {} skipped, {} failed of {}",
            stage.id, t.applied, t.skipped, t.failed, t.total
        ));
    }
    let t = report.totals();
    log.info(&format!(
        "{} modules: {GREEN}{} applied{RESET}, {YELLOW}{} skipped{RESET}, {RED}{} failed{RESET}",
        t.total, t.applied, t.skipped, t.failed
    ));
}
