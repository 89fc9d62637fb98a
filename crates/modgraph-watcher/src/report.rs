//! Log lines for graph diffs, rebuild plans and removals

use modgraph_core::{GraphUpdateResult, ModuleId, RebuildPlan};
use std::path::PathBuf;
use tracing::info;

/// Log every edge added or removed by one update. Silent for empty diffs.
pub fn log_graph_diff(module: &ModuleId, diff: &GraphUpdateResult) {
    if diff.is_empty() {
        return;
    }

    info!(
        "[graph] {} ({} -> {} importees)",
        module, diff.previous_importee_count, diff.next_importee_count
    );
    for (from, to) in &diff.added_edges {
        info!("  + {} -> {}", from, to);
    }
    for (from, to) in &diff.removed_edges {
        info!("  - {} -> {}", from, to);
    }
}

/// Log the order in which modules should be re-evaluated.
pub fn log_rebuild_plan(plan: &RebuildPlan) {
    let changed: Vec<&str> = plan.changed.iter().map(ModuleId::as_str).collect();
    if !plan.has_dependants() {
        info!("[rebuild] change {} (no dependants)", changed.join(", "));
        return;
    }

    info!("[rebuild] change {}", changed.join(", "));
    for (rank, module) in plan.order.iter().enumerate() {
        if plan.changed.contains(module) {
            info!("  source {}", module);
        } else {
            info!("  {:>6} {}", rank, module);
        }
    }
}

pub fn log_watcher_ready(roots: &[PathBuf]) {
    let roots: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
    info!("[watcher] Listening on {}", roots.join(", "));
}

pub fn log_module_removal(module: &ModuleId) {
    info!("[unlink] {} removed from the dependency graph", module);
}
