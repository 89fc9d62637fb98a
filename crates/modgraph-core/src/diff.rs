//! Graph update engine: re-derives one module's edges and reports the diff

use crate::error::ParseError;
use crate::graph::DependencyGraph;
use crate::importees::{build_importee_set, ImportParser, Resolve};
use crate::model::ModuleId;
use serde::{Deserialize, Serialize};

/// Edge diff produced by a single [`update_graph_for_file`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphUpdateResult {
    /// `(importer, importee)` edges that now exist and did not before.
    pub added_edges: Vec<(ModuleId, ModuleId)>,
    /// `(importer, importee)` edges that existed before and are gone now.
    pub removed_edges: Vec<(ModuleId, ModuleId)>,
    pub previous_importee_count: usize,
    pub next_importee_count: usize,
}

impl GraphUpdateResult {
    /// True when the module's importee set did not change.
    pub fn is_empty(&self) -> bool {
        self.added_edges.is_empty() && self.removed_edges.is_empty()
    }
}

/// Re-parse `file_id`, reconcile its outgoing edges and return what changed.
///
/// Every file mutation enters the graph through here. On a parse failure the
/// graph is left untouched and the error is returned to the caller.
pub fn update_graph_for_file(
    graph: &mut DependencyGraph,
    file_id: &ModuleId,
    source: &str,
    parser: &dyn ImportParser,
    resolver: &dyn Resolve,
) -> Result<GraphUpdateResult, ParseError> {
    let previous = graph.importees_of(file_id);
    let next = build_importee_set(parser, source, file_id, resolver)?;

    let removed_edges = previous
        .difference(&next)
        .map(|importee| (file_id.clone(), importee.clone()))
        .collect();
    let added_edges = next
        .difference(&previous)
        .map(|importee| (file_id.clone(), importee.clone()))
        .collect();

    graph.replace_importees(file_id, &next);

    Ok(GraphUpdateResult {
        added_edges,
        removed_edges,
        previous_importee_count: previous.len(),
        next_importee_count: next.len(),
    })
}
