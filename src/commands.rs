//! CLI command implementations

use anyhow::Context;
use modgraph_core::{DependencyGraph, ProjectConfig, distances_up};
use modgraph_watcher::{FileWatcher, WatcherService};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resolve the project root and load its config, applying CLI overrides
fn load_project(
    root: PathBuf,
    entry: Option<PathBuf>,
    roots: Vec<PathBuf>,
) -> anyhow::Result<(PathBuf, ProjectConfig)> {
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("resolving project root {}", root.display()))?;
    let mut config = ProjectConfig::load(&root)?;

    if let Some(entry) = entry {
        config.entry = entry;
    }
    if !roots.is_empty() {
        config.roots = roots;
    }
    Ok((root, config))
}

async fn scanned_service(
    root: PathBuf,
    entry: Option<PathBuf>,
    roots: Vec<PathBuf>,
) -> anyhow::Result<WatcherService> {
    let (root, config) = load_project(root, entry, roots)?;
    let graph = Arc::new(RwLock::new(DependencyGraph::new()));
    let service = WatcherService::from_config(&root, &config, graph)?;
    service.scan(&root.join(&config.entry)).await?;
    Ok(service)
}

pub async fn scan(root: PathBuf, entry: Option<PathBuf>) -> anyhow::Result<()> {
    let (root, config) = load_project(root, entry, Vec::new())?;
    let graph = Arc::new(RwLock::new(DependencyGraph::new()));
    let service = WatcherService::from_config(&root, &config, graph)?;

    let summary = service.scan(&root.join(&config.entry)).await?;
    println!(
        "Scanned {} modules, {} import edges ({} failed)",
        summary.modules, summary.edges, summary.failures
    );
    Ok(())
}

pub async fn plan(
    root: PathBuf,
    entry: Option<PathBuf>,
    changed: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("resolving project root {}", root.display()))?;
    let service = scanned_service(root.clone(), entry, Vec::new()).await?;
    let changed = service.module_id(&root.join(changed));

    let graph = service.graph();
    let graph = graph.read().await;
    if !graph.contains(&changed) {
        tracing::warn!("{} is not reachable from the entry module", changed);
    }

    let seeds = BTreeSet::from([changed]);
    if json {
        let plan = modgraph_core::plan_rebuild(&graph, &seeds);
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for (module, distance) in distances_up(&graph, &seeds) {
        println!("{:>4}  {}", distance, module);
    }
    Ok(())
}

pub async fn watch(root: PathBuf, entry: Option<PathBuf>, roots: Vec<PathBuf>) -> anyhow::Result<()> {
    let service = scanned_service(root, entry, roots).await?;

    let mut watcher = FileWatcher::new(service.path_filter().clone())?;
    for dir in service.roots() {
        watcher.watch_directory(dir)?;
    }
    watcher.mark_ready();

    tokio::select! {
        result = service.process_events(watcher.event_receiver()) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }
    Ok(())
}
