//! Invalidation propagation and rebuild ordering

use crate::graph::DependencyGraph;
use crate::model::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Modules needing re-evaluation after a change, nearest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildPlan {
    pub changed: BTreeSet<ModuleId>,
    /// Changed modules plus all their ancestors.
    pub affected: BTreeSet<ModuleId>,
    /// `affected` sorted by hop distance from the nearest changed module.
    pub order: Vec<ModuleId>,
}

impl RebuildPlan {
    /// True when some module outside the changed set depends on it.
    pub fn has_dependants(&self) -> bool {
        self.affected.len() > self.changed.len()
    }
}

/// Ancestors of `changed` plus `changed` itself.
pub fn affected_importers(graph: &DependencyGraph, changed: &ModuleId) -> BTreeSet<ModuleId> {
    let mut impacted = graph.ancestors_of(changed);
    impacted.insert(changed.clone());
    impacted
}

/// Multi-source BFS over importer edges.
///
/// Seeds get distance 0 and every reachable importer gets its minimum hop count
/// from any seed. The first distance assigned to a module is final, so the
/// output is already in non-decreasing distance order.
pub fn distances_up(graph: &DependencyGraph, changed: &BTreeSet<ModuleId>) -> Vec<(ModuleId, usize)> {
    let mut dist: HashMap<ModuleId, usize> = HashMap::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    for seed in changed {
        dist.insert(seed.clone(), 0);
        order.push((seed.clone(), 0));
        queue.push_back(seed.clone());
    }

    while let Some(current) = queue.pop_front() {
        let d = dist[&current];
        for up in graph.importers_of(&current) {
            if dist.contains_key(&up) {
                continue;
            }
            dist.insert(up.clone(), d + 1);
            order.push((up.clone(), d + 1));
            queue.push_back(up);
        }
    }

    order
}

/// Rebuild order for `changed`: ascending distance, ties in discovery order.
pub fn topo_order_up(graph: &DependencyGraph, changed: &BTreeSet<ModuleId>) -> Vec<ModuleId> {
    distances_up(graph, changed)
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}

/// Affected set and ordered rebuild list for a batch of changed modules.
pub fn plan_rebuild(graph: &DependencyGraph, changed: &BTreeSet<ModuleId>) -> RebuildPlan {
    let order = topo_order_up(graph, changed);
    RebuildPlan {
        changed: changed.clone(),
        affected: order.iter().cloned().collect(),
        order,
    }
}
