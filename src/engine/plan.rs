//! Whole-run resolution of stage and module order.

use super::{Dependable, Id, Module, Stage, graph};
use crate::error::GraphError;

/// A stage together with its modules in execution order.
#[derive(Debug)]
pub struct PlannedStage<'a, S> {
    /// The stage.
    pub stage: &'a S,
    /// The stage's modules, dependencies first.
    pub modules: Vec<&'a dyn Module>,
}

/// Fully resolved execution order for a run.
///
/// Building a plan validates every dependency edge before anything is
/// applied, so a malformed graph anywhere fails the run with no side effects.
#[derive(Debug)]
pub struct Plan<'a, S> {
    stages: Vec<PlannedStage<'a, S>>,
}

impl<'a, S: Stage> Plan<'a, S> {
    /// Resolve stage order, then each stage's module order.
    ///
    /// Also records computed back-edges (`dependants`) and the informational
    /// stage/module hierarchy links. Module dependencies are scoped to their
    /// owning stage.
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphError`] found, checking stages before modules
    /// and stages in input order.
    pub fn resolve(stages: &'a mut [S]) -> Result<Self, GraphError> {
        let stage_order = {
            let mut refs: Vec<&mut S> = stages.iter_mut().collect();
            graph::resolve(&mut refs)?
        };

        let mut module_orders = Vec::with_capacity(stages.len());
        for stage in stages.iter_mut() {
            let stage_id = stage.id().clone();
            let (order, children) = {
                let mut modules = stage.modules_mut();
                for module in &mut modules {
                    module.set_parent(stage_id.clone());
                }
                let children: Vec<Id> = modules.iter().map(|m| m.id().clone()).collect();
                (graph::resolve(&mut modules)?, children)
            };
            for child in children {
                stage.add_child(child);
            }
            module_orders.push(order);
        }

        let stages: &'a [S] = stages;
        let planned = stage_order
            .into_iter()
            .filter_map(|si| {
                let stage = stages.get(si)?;
                let modules = stage.modules();
                let order = module_orders.get(si)?;
                Some(PlannedStage {
                    stage,
                    modules: order
                        .iter()
                        .filter_map(|&mi| modules.get(mi).copied())
                        .collect(),
                })
            })
            .collect();

        Ok(Self { stages: planned })
    }

    /// Stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[PlannedStage<'a, S>] {
        &self.stages
    }

    /// Identifiers of every stage and its modules, in execution order.
    #[must_use]
    pub fn order(&self) -> Vec<(Id, Vec<Id>)> {
        self.stages
            .iter()
            .map(|p| {
                (
                    p.stage.id().clone(),
                    p.modules.iter().map(|m| m.id().clone()).collect(),
                )
            })
            .collect()
    }
}
