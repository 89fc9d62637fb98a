//! Integration tests for Modgraph
//!
//! These tests verify that parsing, resolution, the graph and the watcher
//! service work together on a real project layout.

use modgraph_core::{
    DependencyGraph, ModuleId, ProjectConfig, affected_importers, normalize_id, topo_order_up,
    update_graph_for_file,
};
use modgraph_indexer::{RelativeResolver, TreeSitterImportParser};
use modgraph_watcher::{GraphEvent, WatchEvent, WatcherService, initial_scan};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;

/// App imports UI, UI imports Utils; the entry pulls in a JSX widget too.
fn create_diamond_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("src/components")).unwrap();
    fs::write(
        root.join("src/main.ts"),
        "import { App } from './App';\nimport { Widget } from './components';\n",
    )
    .unwrap();
    fs::write(
        root.join("src/App.tsx"),
        "import { Button } from './UI';\nexport const App = () => <Button />;\n",
    )
    .unwrap();
    fs::write(
        root.join("src/UI.ts"),
        "import { clamp } from './Utils';\nimport React from 'react';\nexport const Button = clamp;\n",
    )
    .unwrap();
    fs::write(root.join("src/Utils.js"), "export function clamp(x) { return x; }\n").unwrap();
    fs::write(
        root.join("src/components/index.jsx"),
        "const utils = require('../Utils');\nexport const Widget = () => <div />;\n",
    )
    .unwrap();

    temp_dir
}

fn id(root: &Path, relative: &str) -> ModuleId {
    normalize_id(relative, root)
}

#[test]
fn test_scan_and_rebuild_order() {
    let temp_dir = create_diamond_project();
    let root = temp_dir.path();

    let mut graph = DependencyGraph::new();
    let summary = initial_scan(
        &mut graph,
        &id(root, "src/main.ts"),
        &TreeSitterImportParser,
        &RelativeResolver::default(),
        None,
    )
    .unwrap();

    assert_eq!(summary.modules, 5);
    assert_eq!(summary.failures, 0);

    let utils = id(root, "src/Utils.js");
    let affected = affected_importers(&graph, &utils);
    let expected: BTreeSet<ModuleId> = [
        "src/Utils.js",
        "src/UI.ts",
        "src/App.tsx",
        "src/components/index.jsx",
        "src/main.ts",
    ]
    .iter()
    .map(|p| id(root, p))
    .collect();
    assert_eq!(affected, expected);

    let order = topo_order_up(&graph, &BTreeSet::from([utils.clone()]));
    let position = |p: &str| order.iter().position(|m| *m == id(root, p)).unwrap();
    assert_eq!(position("src/Utils.js"), 0);
    assert!(position("src/UI.ts") < position("src/App.tsx"));
    assert!(position("src/components/index.jsx") < position("src/App.tsx"));
    assert_eq!(position("src/main.ts"), 4);

    assert_eq!(graph.descendants_of(&id(root, "src/main.ts")).len(), 4);
}

#[test]
fn test_edit_cycle_keeps_graph_consistent() {
    let temp_dir = create_diamond_project();
    let root = temp_dir.path();
    let parser = TreeSitterImportParser;
    let resolver = RelativeResolver::default();

    let mut graph = DependencyGraph::new();
    initial_scan(&mut graph, &id(root, "src/main.ts"), &parser, &resolver, None).unwrap();

    // UI stops importing Utils and starts importing App: a cycle appears.
    let ui = id(root, "src/UI.ts");
    let diff = update_graph_for_file(&mut graph, &ui, "import { App } from './App';\n", &parser, &resolver)
        .unwrap();
    assert_eq!(diff.added_edges, vec![(ui.clone(), id(root, "src/App.tsx"))]);
    assert_eq!(diff.removed_edges, vec![(ui.clone(), id(root, "src/Utils.js"))]);

    let ancestors = graph.ancestors_of(&ui);
    assert!(ancestors.contains(&id(root, "src/App.tsx")));
    assert!(ancestors.contains(&id(root, "src/main.ts")));
    assert!(!ancestors.contains(&ui));

    for module in graph.module_ids() {
        for importee in graph.importees_of(&module) {
            assert!(graph.importers_of(&importee).contains(&module));
        }
    }
}

#[tokio::test]
async fn test_watcher_service_end_to_end() {
    let temp_dir = create_diamond_project();
    let root = temp_dir.path();

    let graph = Arc::new(RwLock::new(DependencyGraph::new()));
    let service = WatcherService::from_config(root, &ProjectConfig::default(), graph.clone()).unwrap();
    service.scan(&root.join("src/main.ts")).await.unwrap();

    let utils_path = root.join("src/Utils.js");
    fs::write(&utils_path, "export function clamp(x) { return Math.max(0, x); }\n").unwrap();
    let event = service.apply(WatchEvent::Changed(utils_path)).await.unwrap();

    match event {
        Some(GraphEvent::Changed { plan, diff, .. }) => {
            assert!(diff.is_empty());
            assert_eq!(plan.order.len(), 5);
            assert_eq!(plan.order.last(), Some(&id(root, "src/main.ts")));
        }
        other => panic!("Expected change event, got {:?}", other),
    }

    // Readers see the same graph the service writes.
    assert_eq!(graph.read().await.node_count(), 5);
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_modgraph"))
        .arg("version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Modgraph v"));
}

#[test]
fn test_cli_scan() {
    let temp_dir = create_diamond_project();
    let output = Command::new(env!("CARGO_BIN_EXE_modgraph"))
        .args(["--root", temp_dir.path().to_str().unwrap(), "scan", "src/main.ts"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Scanned 5 modules, 5 import edges"));
}
