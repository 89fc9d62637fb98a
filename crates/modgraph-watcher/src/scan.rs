//! Initial graph population starting from an entry module

use anyhow::{Context, Result};
use modgraph_core::{
    DependencyGraph, FingerprintCache, ImportParser, ModuleId, ParseError, Resolve,
    update_graph_for_file,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Outcome of [`initial_scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Modules read during the scan.
    pub modules: usize,
    /// Import edges in the graph afterwards.
    pub edges: usize,
    /// Modules whose source could not be parsed or read.
    pub failures: usize,
}

/// Walk the import graph depth-first from `entry`, reading each reachable
/// module once and recording its edges.
///
/// An unreadable entry is an error. Other modules that fail to read or parse
/// are logged and kept in the graph without outgoing edges.
pub fn initial_scan(
    graph: &mut DependencyGraph,
    entry: &ModuleId,
    parser: &dyn ImportParser,
    resolver: &dyn Resolve,
    fingerprints: Option<&FingerprintCache>,
) -> Result<ScanSummary> {
    let mut visited = HashSet::new();
    let mut stack = vec![entry.clone()];
    let mut failures = 0;

    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }

        let source = match std::fs::read_to_string(id.to_path()) {
            Ok(source) => source,
            Err(e) if &id == entry => {
                return Err(e).with_context(|| format!("reading entry module {}", id));
            }
            Err(e) => {
                warn!("Skipping unreadable module {}: {}", id, e);
                graph.ensure_node(&id);
                failures += 1;
                continue;
            }
        };

        if let Some(cache) = fingerprints {
            cache.has_changed(&id, source.as_bytes());
        }

        match update_graph_for_file(graph, &id, &source, parser, resolver) {
            Ok(diff) => debug!("Scanned {} ({} importees)", id, diff.next_importee_count),
            Err(ParseError::UnsupportedSource(_)) => {
                debug!("No parser for {}, keeping it as a leaf", id);
                graph.ensure_node(&id);
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", id, e);
                graph.ensure_node(&id);
                failures += 1;
            }
        }

        stack.extend(
            graph
                .importees_of(&id)
                .into_iter()
                .filter(|importee| !visited.contains(importee)),
        );
    }

    Ok(ScanSummary {
        modules: visited.len(),
        edges: graph.edge_count(),
        failures,
    })
}
