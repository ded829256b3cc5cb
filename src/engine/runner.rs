//! Sequential application of a resolved [`Plan`].

use thiserror::Error;

use super::{ApplyError, Context, Event, Id, Module, Plan, Reporter, Stage};
use crate::error::GraphError;

/// Terminal outcome of one module within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// The module changed the system.
    Applied,
    /// The desired state was already present.
    SkippedNoop,
    /// The module was optional and confirmation was declined.
    SkippedDeclined,
    /// The module's action failed.
    Failed,
}

/// What happened to one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Module identifier.
    pub id: Id,
    /// Terminal outcome.
    pub outcome: ModuleOutcome,
    /// Meta description reported by the module (empty when declined).
    pub meta: String,
    /// Rendered failure cause, for [`ModuleOutcome::Failed`].
    pub error: Option<String>,
}

/// Per-stage outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTally {
    /// Modules that changed the system.
    pub applied: usize,
    /// Modules skipped (declined or already satisfied).
    pub skipped: usize,
    /// Modules whose action failed.
    pub failed: usize,
    /// Modules in the stage.
    pub total: usize,
}

impl StageTally {
    const fn record(&mut self, outcome: ModuleOutcome) {
        match outcome {
            ModuleOutcome::Applied => self.applied += 1,
            ModuleOutcome::SkippedNoop | ModuleOutcome::SkippedDeclined => self.skipped += 1,
            ModuleOutcome::Failed => self.failed += 1,
        }
    }
}

/// Outcomes of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Stage identifier.
    pub id: Id,
    /// Records of attempted modules, in execution order.
    pub modules: Vec<ModuleRecord>,
    /// Outcome counts.
    pub tally: StageTally,
}

/// Outcomes of every stage reached in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Stage reports, in execution order.
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Sum of all stage tallies.
    #[must_use]
    pub fn totals(&self) -> StageTally {
        self.stages
            .iter()
            .fold(StageTally::default(), |acc, s| StageTally {
                applied: acc.applied + s.tally.applied,
                skipped: acc.skipped + s.tally.skipped,
                failed: acc.failed + s.tally.failed,
                total: acc.total + s.tally.total,
            })
    }
}

/// Why a run stopped early.
#[derive(Error, Debug)]
pub enum AbortReason {
    /// The stage or module graph is malformed; nothing was applied.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A mandatory module failed.
    #[error("mandatory module '{module}' in stage '{stage}' failed: {source}")]
    FailedMandatory {
        /// Owning stage.
        stage: Id,
        /// Failed module.
        module: Id,
        /// Failure cause.
        source: ApplyError,
    },

    /// A module other modules depend on failed.
    #[error(
        "module '{module}' in stage '{stage}' failed and is a dependency for {}: {source}",
        quoted(.dependants)
    )]
    FailedDependency {
        /// Owning stage.
        stage: Id,
        /// Failed module.
        module: Id,
        /// Modules that depend on the failed one.
        dependants: Vec<Id>,
        /// Failure cause.
        source: ApplyError,
    },

    /// Cancellation was requested between modules.
    #[error("cancelled before module '{next}' in stage '{stage}'")]
    Cancelled {
        /// Stage that was running.
        stage: Id,
        /// First module that was not attempted.
        next: Id,
    },
}

fn quoted(ids: &[Id]) -> String {
    ids.iter()
        .map(|id| format!("'{id}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A run that stopped before completing, with everything done up to that point.
///
/// Applied modules are not rolled back.
#[derive(Error, Debug)]
#[error("run aborted: {reason}")]
pub struct Aborted {
    /// Why the run stopped.
    pub reason: AbortReason,
    /// Outcomes recorded before the abort.
    pub report: RunReport,
}

/// Applies stages and modules one at a time, in dependency order.
pub struct Engine<'a> {
    ctx: &'a Context,
    reporter: &'a dyn Reporter,
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("ctx", self.ctx)
            .field("reporter", &"<dyn Reporter>")
            .finish()
    }
}

impl<'a> Engine<'a> {
    /// Create an engine applying modules with `ctx` and reporting to `reporter`.
    #[must_use]
    pub const fn new(ctx: &'a Context, reporter: &'a dyn Reporter) -> Self {
        Self { ctx, reporter }
    }

    /// Resolve and apply every stage.
    ///
    /// # Errors
    ///
    /// Returns [`Aborted`] on a malformed graph (before anything is applied),
    /// when a load-bearing or mandatory module fails, or on cancellation.
    pub fn run<S: Stage>(&self, stages: &mut [S]) -> Result<RunReport, Aborted> {
        let plan = Plan::resolve(stages).map_err(|e| Aborted {
            reason: AbortReason::Graph(e),
            report: RunReport::default(),
        })?;
        self.execute(&plan)
    }

    /// Apply an already resolved plan.
    ///
    /// Modules that fail without dependants and without being mandatory are
    /// recorded and the run continues.
    ///
    /// # Errors
    ///
    /// Returns [`Aborted`] when a load-bearing or mandatory module fails, or
    /// when cancellation is observed before a module starts.
    pub fn execute<S: Stage>(&self, plan: &Plan<'_, S>) -> Result<RunReport, Aborted> {
        let mut report = RunReport::default();

        for planned in plan.stages() {
            let stage = planned.stage.id();
            let total = planned.modules.len();
            let mut stage_report = StageReport {
                id: stage.clone(),
                modules: Vec::with_capacity(total),
                tally: StageTally {
                    total,
                    ..StageTally::default()
                },
            };

            if planned.modules.is_empty() {
                self.reporter.report(&Event::StageEmpty { stage });
                report.stages.push(stage_report);
                continue;
            }

            self.reporter.report(&Event::StageStarted {
                stage,
                modules: total,
            });

            for (i, &module) in planned.modules.iter().enumerate() {
                if self.ctx.cancel.is_cancelled() {
                    report.stages.push(stage_report);
                    return Err(Aborted {
                        reason: AbortReason::Cancelled {
                            stage: stage.clone(),
                            next: module.id().clone(),
                        },
                        report,
                    });
                }

                let (record, failure) = self.apply_module(module);
                stage_report.tally.record(record.outcome);
                self.reporter.report(&Event::ModuleFinished {
                    stage,
                    index: i + 1,
                    total,
                    record: &record,
                });
                stage_report.modules.push(record);

                let Some(source) = failure else {
                    continue;
                };
                let reason = if module.is_dependency() {
                    AbortReason::FailedDependency {
                        stage: stage.clone(),
                        module: module.id().clone(),
                        dependants: module.dependants().to_vec(),
                        source,
                    }
                } else if module.is_mandatory() {
                    AbortReason::FailedMandatory {
                        stage: stage.clone(),
                        module: module.id().clone(),
                        source,
                    }
                } else {
                    continue;
                };
                report.stages.push(stage_report);
                return Err(Aborted { reason, report });
            }

            self.reporter.report(&Event::StageFinished {
                stage,
                tally: &stage_report.tally,
            });
            report.stages.push(stage_report);
        }

        Ok(report)
    }

    fn apply_module(&self, module: &dyn Module) -> (ModuleRecord, Option<ApplyError>) {
        let id = module.id().clone();

        if module.is_optional()
            && !self.ctx.confirm.ask_yes_no(
                &format!("Module {id} is optional.\nIf you wish to install it press Y/y."),
                "y",
            )
        {
            self.ctx.log.debug(&format!("{id}: declined"));
            let record = ModuleRecord {
                id,
                outcome: ModuleOutcome::SkippedDeclined,
                meta: String::new(),
                error: None,
            };
            return (record, None);
        }

        self.ctx.log.debug(&format!("{id}: applying"));
        match module.apply(self.ctx) {
            Ok(change) => {
                let outcome = if change.changed {
                    ModuleOutcome::Applied
                } else {
                    ModuleOutcome::SkippedNoop
                };
                let record = ModuleRecord {
                    id,
                    outcome,
                    meta: change.meta,
                    error: None,
                };
                (record, None)
            }
            Err(err) => {
                self.ctx.log.debug(&format!("{id}: {err:?}"));
                let record = ModuleRecord {
                    id,
                    outcome: ModuleOutcome::Failed,
                    meta: err.meta.clone(),
                    error: Some(err.to_string()),
                };
                (record, Some(err))
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::engine::test_helpers::{
        RecordingReporter, Script, ScriptedModule, ScriptedStage, calls, context,
        context_answering,
    };

    fn run(
        ctx: &Context,
        stages: &mut [ScriptedStage],
    ) -> (Result<RunReport, Aborted>, Vec<String>) {
        let reporter = RecordingReporter::default();
        let result = Engine::new(ctx, &reporter).run(stages);
        let events = reporter.events.into_inner().unwrap();
        (result, events)
    }

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[test]
    fn chain_applies_in_dependency_order() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![
                ScriptedModule::new("C", &["B"], Script::Apply, &c),
                ScriptedModule::new("B", &["A"], Script::Apply, &c),
                ScriptedModule::new("A", &[], Script::Apply, &c),
            ],
        )];
        let (result, events) = run(&context(), &mut stages);
        let report = result.unwrap();
        assert_eq!(*c.lock().unwrap(), ["A", "B", "C"]);
        assert_eq!(report.totals().applied, 3);
        assert_eq!(
            events,
            [
                "start main (3)",
                "[1/3] A Applied",
                "[2/3] B Applied",
                "[3/3] C Applied",
                "finish main a=3 s=0 f=0 n=3",
            ]
        );
    }

    #[test]
    fn noop_is_tallied_as_skipped() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![ScriptedModule::new("P", &[], Script::Noop, &c)],
        )];
        let (result, _) = run(&context(), &mut stages);
        let report = result.unwrap();
        let tally = report.stages[0].tally;
        assert_eq!((tally.applied, tally.skipped, tally.failed), (0, 1, 0));
        assert_eq!(report.stages[0].modules[0].outcome, ModuleOutcome::SkippedNoop);
        assert_eq!(report.stages[0].modules[0].meta, "script: Noop");
    }

    #[test]
    fn empty_stage_is_noted_only() {
        let c = calls();
        let mut stages = vec![
            ScriptedStage::new("empty", &[], vec![]),
            ScriptedStage::new("full", &[], vec![ScriptedModule::new("m", &[], Script::Apply, &c)]),
        ];
        let (result, events) = run(&context(), &mut stages);
        assert_eq!(result.unwrap().stages.len(), 2);
        assert_eq!(events[0], "empty empty");
    }

    // -----------------------------------------------------------------------
    // Optional modules
    // -----------------------------------------------------------------------

    #[test]
    fn declined_optional_is_never_applied() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![ScriptedModule::new("F", &[], Script::Apply, &c).optional()],
        )];
        let (result, _) = run(&context_answering(false), &mut stages);
        let report = result.unwrap();
        assert!(c.lock().unwrap().is_empty(), "apply must not be invoked");
        assert_eq!(report.stages[0].tally.skipped, 1);
        assert_eq!(
            report.stages[0].modules[0].outcome,
            ModuleOutcome::SkippedDeclined
        );
    }

    #[test]
    fn accepted_optional_is_applied() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![ScriptedModule::new("F", &[], Script::Apply, &c).optional()],
        )];
        let (result, _) = run(&context_answering(true), &mut stages);
        assert_eq!(result.unwrap().totals().applied, 1);
        assert_eq!(*c.lock().unwrap(), ["F"]);
    }

    #[test]
    fn optional_prompt_names_module() {
        use crate::confirm::MockConfirm;
        use crate::exec::test_helpers::MockExecutor;
        use crate::logging::Logger;
        use std::sync::Arc;

        let mut confirm = MockConfirm::new();
        confirm
            .expect_ask_yes_no()
            .withf(|prompt, affirmative| {
                prompt.contains("Module F is optional.\nIf you wish to install it press Y/y.")
                    && affirmative.eq_ignore_ascii_case("y")
            })
            .times(1)
            .return_const(false);
        let ctx = Context::new(
            Arc::new(Logger::new("test")),
            Arc::new(MockExecutor::with_responses(vec![])),
            Arc::new(confirm),
        );
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![ScriptedModule::new("F", &[], Script::Apply, &c).optional()],
        )];
        let (result, _) = run(&ctx, &mut stages);
        assert!(result.is_ok());
    }

    // -----------------------------------------------------------------------
    // Failures
    // -----------------------------------------------------------------------

    #[test]
    fn plain_failure_is_absorbed() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![
                ScriptedModule::new("bad", &[], Script::Fail, &c),
                ScriptedModule::new("good", &[], Script::Apply, &c),
            ],
        )];
        let (result, _) = run(&context(), &mut stages);
        let report = result.unwrap();
        assert_eq!(*c.lock().unwrap(), ["bad", "good"]);
        let tally = report.stages[0].tally;
        assert_eq!((tally.applied, tally.failed, tally.total), (1, 1, 2));
        assert_eq!(
            report.stages[0].modules[0].error.as_deref(),
            Some("scripted failure")
        );
    }

    #[test]
    fn failed_dependency_aborts_before_dependant() {
        let c = calls();
        let mut stages = vec![
            ScriptedStage::new(
                "main",
                &[],
                vec![
                    ScriptedModule::new("G", &[], Script::Fail, &c),
                    ScriptedModule::new("H", &["G"], Script::Apply, &c),
                ],
            ),
            ScriptedStage::new("later", &["main"], vec![ScriptedModule::new("L", &[], Script::Apply, &c)]),
        ];
        let (result, events) = run(&context(), &mut stages);
        let aborted = result.unwrap_err();
        assert_eq!(*c.lock().unwrap(), ["G"]);
        match &aborted.reason {
            AbortReason::FailedDependency {
                stage,
                module,
                dependants,
                ..
            } => {
                assert_eq!(stage.as_str(), "main");
                assert_eq!(module.as_str(), "G");
                assert_eq!(dependants, &[Id::from("H")]);
            }
            other => panic!("unexpected abort reason: {other:?}"),
        }
        assert_eq!(aborted.report.stages.len(), 1);
        assert_eq!(aborted.report.stages[0].tally.failed, 1);
        assert!(!events.iter().any(|e| e.starts_with("finish")));
        assert_eq!(
            aborted.to_string(),
            "run aborted: module 'G' in stage 'main' failed and is a dependency for 'H': scripted failure"
        );
    }

    #[test]
    fn failed_mandatory_aborts_without_dependants() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![
                ScriptedModule::new("M", &[], Script::Fail, &c).mandatory(),
                ScriptedModule::new("next", &[], Script::Apply, &c),
            ],
        )];
        let (result, _) = run(&context(), &mut stages);
        let aborted = result.unwrap_err();
        assert!(matches!(
            aborted.reason,
            AbortReason::FailedMandatory { ref module, .. } if module.as_str() == "M"
        ));
        assert_eq!(*c.lock().unwrap(), ["M"]);
    }

    #[test]
    fn mandatory_noop_does_not_abort() {
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![ScriptedModule::new("M", &[], Script::Noop, &c).mandatory()],
        )];
        let (result, _) = run(&context(), &mut stages);
        assert!(result.is_ok());
    }

    // -----------------------------------------------------------------------
    // Graph errors and cancellation
    // -----------------------------------------------------------------------

    #[test]
    fn unresolved_dependency_applies_nothing() {
        let c = calls();
        let mut stages = vec![
            ScriptedStage::new("ok", &[], vec![ScriptedModule::new("A", &[], Script::Apply, &c)]),
            ScriptedStage::new(
                "broken",
                &[],
                vec![ScriptedModule::new("D", &["E"], Script::Apply, &c)],
            ),
        ];
        let (result, events) = run(&context(), &mut stages);
        let aborted = result.unwrap_err();
        assert!(matches!(
            aborted.reason,
            AbortReason::Graph(GraphError::UnresolvedDependency { .. })
        ));
        assert!(c.lock().unwrap().is_empty());
        assert!(events.is_empty());
        assert!(aborted.report.stages.is_empty());
    }

    #[test]
    fn cancellation_stops_before_next_module() {
        let ctx = context();
        ctx.cancel.cancel();
        let c = calls();
        let mut stages = vec![ScriptedStage::new(
            "main",
            &[],
            vec![ScriptedModule::new("A", &[], Script::Apply, &c)],
        )];
        let (result, _) = run(&ctx, &mut stages);
        let aborted = result.unwrap_err();
        assert!(matches!(
            aborted.reason,
            AbortReason::Cancelled { ref next, .. } if next.as_str() == "A"
        ));
        assert!(c.lock().unwrap().is_empty());
    }

    #[test]
    fn cancellation_mid_stage_keeps_partial_report() {
        let ctx = context();
        let c = calls();
        let mut stages = vec![
            ScriptedStage::new(
                "s",
                &[],
                vec![
                    ScriptedModule::new("A", &[], Script::Cancel, &c),
                    ScriptedModule::new("B", &[], Script::Apply, &c),
                ],
            ),
            ScriptedStage::new(
                "later",
                &["s"],
                vec![ScriptedModule::new("L", &[], Script::Apply, &c)],
            ),
        ];
        let (result, events) = run(&ctx, &mut stages);
        let aborted = result.unwrap_err();

        assert_eq!(
            aborted.reason.to_string(),
            "cancelled before module 'B' in stage 's'"
        );
        assert_eq!(*c.lock().unwrap(), ["A"]);
        assert_eq!(aborted.report.stages.len(), 1);
        let stage = &aborted.report.stages[0];
        assert_eq!(stage.modules.len(), 1);
        assert_eq!(stage.modules[0].id.as_str(), "A");
        assert_eq!(stage.modules[0].outcome, ModuleOutcome::Applied);
        assert_eq!(stage.tally.applied, 1);
        assert!(!events.iter().any(|e| e.starts_with("finish")));
    }
}
