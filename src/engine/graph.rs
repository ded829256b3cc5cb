//! Dependency graph resolution.

use std::collections::HashMap;

use super::{Dependable, Id};
use crate::error::GraphError;

/// Traversal state of a unit during the depth-first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Topologically order `units` so every unit follows everything it depends on.
///
/// Returns the positions of `units` in execution order. As a side effect,
/// every unit's `dependants` list is populated with the identifiers of the
/// units that depend on it.
///
/// Ordering rules:
/// 1. Units without dependencies come first, in input order.
/// 2. Every remaining unit, in input order, is emitted after its transitive
///    dependency closure (depth-first post-order), skipping units already
///    emitted.
///
/// Re-resolving an already resolved sequence yields the same order.
///
/// # Errors
///
/// - [`GraphError::UnresolvedDependency`] if a unit names a dependency that is
///   not in `units`. Dependants are left untouched in this case.
/// - [`GraphError::CycleDetected`] if the dependencies form a cycle,
///   including a unit depending on itself.
pub fn resolve<D: Dependable + ?Sized>(units: &mut [&mut D]) -> Result<Vec<usize>, GraphError> {
    // Later units win on duplicate identifiers.
    let index: HashMap<Id, usize> = units
        .iter()
        .enumerate()
        .map(|(i, u)| (u.id().clone(), i))
        .collect();

    let mut edges: Vec<Vec<usize>> = Vec::with_capacity(units.len());
    for unit in units.iter() {
        let mut deps = Vec::with_capacity(unit.dependencies().len());
        for dep in unit.dependencies() {
            let Some(&target) = index.get(dep) else {
                return Err(GraphError::UnresolvedDependency {
                    unit: unit.id().clone(),
                    missing: dep.clone(),
                });
            };
            deps.push(target);
        }
        edges.push(deps);
    }

    for (i, deps) in edges.iter().enumerate() {
        let Some(id) = units.get(i).map(|u| u.id().clone()) else {
            continue;
        };
        for &target in deps {
            if let Some(dep) = units.get_mut(target) {
                dep.add_dependant(id.clone());
            }
        }
    }

    let mut marks = vec![Mark::Unvisited; units.len()];
    let mut order = Vec::with_capacity(units.len());

    for (i, deps) in edges.iter().enumerate() {
        if deps.is_empty()
            && let Some(mark) = marks.get_mut(i)
        {
            *mark = Mark::Done;
            order.push(i);
        }
    }

    let mut stack = Vec::new();
    for i in 0..units.len() {
        if let Err(cycle) = visit(i, &edges, &mut marks, &mut stack, &mut order) {
            return Err(GraphError::CycleDetected {
                units: cycle
                    .iter()
                    .filter_map(|&n| units.get(n).map(|u| u.id().clone()))
                    .collect(),
            });
        }
    }

    Ok(order)
}

/// Depth-first visit of `node`, appending it to `order` after its dependencies.
///
/// On a back edge, returns the positions forming the cycle, starting at the
/// unit that closes it.
fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
    order: &mut Vec<usize>,
) -> Result<(), Vec<usize>> {
    match marks.get(node) {
        Some(Mark::Done) | None => return Ok(()),
        Some(Mark::InProgress) => {
            let start = stack.iter().position(|&n| n == node).unwrap_or(0);
            return Err(stack.get(start..).unwrap_or_default().to_vec());
        }
        Some(Mark::Unvisited) => {}
    }

    if let Some(mark) = marks.get_mut(node) {
        *mark = Mark::InProgress;
    }
    stack.push(node);

    for &dep in edges.get(node).map(Vec::as_slice).unwrap_or_default() {
        visit(dep, edges, marks, stack, order)?;
    }

    stack.pop();
    if let Some(mark) = marks.get_mut(node) {
        *mark = Mark::Done;
    }
    order.push(node);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
pub mod test_helpers {
    //! Minimal [`Dependable`] unit for graph tests.

    use crate::engine::{Base, Dependable};

    /// A bare graph node.
    #[derive(Debug, Clone)]
    pub struct Node(pub Base);

    impl Node {
        /// Create a node with the given dependencies.
        pub fn new(id: &str, deps: &[&str]) -> Self {
            Self(Base::new(id, deps))
        }
    }

    impl Dependable for Node {
        fn base(&self) -> &Base {
            &self.0
        }
        fn base_mut(&mut self) -> &mut Base {
            &mut self.0
        }
    }

    /// Resolve `nodes` and return their identifiers in resolved order.
    pub fn sorted_ids(nodes: &mut [Node]) -> Result<Vec<String>, crate::error::GraphError> {
        let order = {
            let mut refs: Vec<&mut Node> = nodes.iter_mut().collect();
            super::resolve(&mut refs)?
        };
        Ok(order
            .into_iter()
            .map(|i| nodes[i].id().to_string())
            .collect())
    }
}
