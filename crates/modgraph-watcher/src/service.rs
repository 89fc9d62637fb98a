//! Single-writer service applying watch events to the dependency graph

use crate::report::{log_graph_diff, log_module_removal, log_rebuild_plan, log_watcher_ready};
use crate::scan::{ScanSummary, initial_scan};
use crate::watcher::{PathFilter, WatchEvent};
use anyhow::{Context, Result};
use modgraph_core::{
    DependencyGraph, FingerprintCache, GraphUpdateResult, ImportParser, ModuleId, ProjectConfig,
    RebuildPlan, Resolve, normalize_id, plan_rebuild, update_graph_for_file,
};
use modgraph_indexer::{RelativeResolver, TreeSitterImportParser};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// What applying one watch event did to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEvent {
    /// A new module entered the graph.
    Added { module: ModuleId, diff: GraphUpdateResult },
    /// A module's content changed; `plan` lists what must be rebuilt.
    Changed {
        module: ModuleId,
        diff: GraphUpdateResult,
        plan: RebuildPlan,
    },
    /// Modules left the graph; `plan` was computed before removal.
    Removed { modules: Vec<ModuleId>, plan: RebuildPlan },
    /// The module could not be parsed; its previous edges were kept.
    ParseFailed { module: ModuleId, message: String },
    Ready,
}

impl GraphEvent {
    /// JSON message for downstream consumers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Owns the graph's write side. Events must be applied from a single task;
/// readers take snapshots through [`WatcherService::graph`].
pub struct WatcherService {
    root: PathBuf,
    roots: Vec<PathBuf>,
    filter: PathFilter,
    graph: Arc<RwLock<DependencyGraph>>,
    fingerprints: FingerprintCache,
    parser: Arc<dyn ImportParser>,
    resolver: Arc<dyn Resolve>,
    event_tx: Option<broadcast::Sender<GraphEvent>>,
}

impl WatcherService {
    /// Create a service with explicit parser and resolver capabilities
    pub fn new(
        root: impl AsRef<Path>,
        config: &ProjectConfig,
        graph: Arc<RwLock<DependencyGraph>>,
        parser: Arc<dyn ImportParser>,
        resolver: Arc<dyn Resolve>,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let roots = config.roots.iter().map(|r| root.join(r)).collect();
        Ok(Self {
            root,
            roots,
            filter: PathFilter::new(config)?,
            graph,
            fingerprints: FingerprintCache::new(),
            parser,
            resolver,
            event_tx: None,
        })
    }

    /// Create a service using the tree-sitter parser and the relative resolver
    pub fn from_config(
        root: impl AsRef<Path>,
        config: &ProjectConfig,
        graph: Arc<RwLock<DependencyGraph>>,
    ) -> Result<Self> {
        Self::new(
            root,
            config,
            graph,
            Arc::new(TreeSitterImportParser::new()),
            Arc::new(RelativeResolver::from_config(config)),
        )
    }

    /// Broadcast every produced [`GraphEvent`] on `event_tx`
    pub fn with_broadcast(mut self, event_tx: broadcast::Sender<GraphEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Shared handle to the graph, for readers
    pub fn graph(&self) -> Arc<RwLock<DependencyGraph>> {
        Arc::clone(&self.graph)
    }

    /// Directories the watcher should cover
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn path_filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Canonical id for a raw watcher path
    pub fn module_id(&self, path: &Path) -> ModuleId {
        normalize_id(&path.to_string_lossy(), &self.root)
    }

    /// Populate the graph from `entry` and prime content fingerprints
    pub async fn scan(&self, entry: &Path) -> Result<ScanSummary> {
        let entry = self.module_id(entry);
        let mut graph = self.graph.write().await;
        let summary = initial_scan(
            &mut graph,
            &entry,
            self.parser.as_ref(),
            self.resolver.as_ref(),
            Some(&self.fingerprints),
        )?;
        info!(
            "Scanned {} modules ({} edges) from {}",
            summary.modules, summary.edges, entry
        );
        Ok(summary)
    }

    /// Consume watch events until the stream closes
    pub async fn process_events(&self, events: &mut mpsc::UnboundedReceiver<WatchEvent>) -> Result<()> {
        while let Some(event) = events.recv().await {
            debug!("Processing watch event: {:?}", event);

            match self.apply(event).await {
                Ok(Some(graph_event)) => self.publish(graph_event),
                Ok(None) => {}
                Err(e) => error!("Failed to apply watch event: {:#}", e),
            }
        }

        info!("Watch event stream closed");
        Ok(())
    }

    /// Apply one event to the graph
    pub async fn apply(&self, event: WatchEvent) -> Result<Option<GraphEvent>> {
        match event {
            WatchEvent::Added(path) => self.handle_added(&path).await,
            WatchEvent::Changed(path) => self.handle_changed(&path).await,
            WatchEvent::Removed(path) => Ok(self.handle_removed(&path).await),
            WatchEvent::Ready => {
                log_watcher_ready(&self.roots);
                Ok(Some(GraphEvent::Ready))
            }
        }
    }

    fn publish(&self, event: GraphEvent) {
        if let Some(ref event_tx) = self.event_tx {
            // No receivers just means nobody is listening yet
            let _ = event_tx.send(event);
        }
    }

    async fn handle_added(&self, path: &Path) -> Result<Option<GraphEvent>> {
        if !self.filter.is_module(path) {
            return Ok(None);
        }
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Ok(None),
        }

        let id = self.module_id(path);
        let source = read_source(path).await?;
        self.fingerprints.has_changed(&id, source.as_bytes());

        let mut graph = self.graph.write().await;
        let updated = update_graph_for_file(&mut graph, &id, &source, self.parser.as_ref(), self.resolver.as_ref());
        match updated {
            Ok(diff) => {
                drop(graph);
                log_graph_diff(&id, &diff);
                Ok(Some(GraphEvent::Added { module: id, diff }))
            }
            Err(e) => {
                graph.ensure_node(&id);
                drop(graph);
                warn!("Failed to parse new module {}: {}", id, e);
                Ok(Some(GraphEvent::ParseFailed { module: id, message: e.to_string() }))
            }
        }
    }

    async fn handle_changed(&self, path: &Path) -> Result<Option<GraphEvent>> {
        if !self.filter.is_module(path) {
            return Ok(None);
        }

        let id = self.module_id(path);
        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} vanished before it could be read, removing", id);
                return Ok(self.handle_removed(path).await);
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        if !self.fingerprints.has_changed(&id, source.as_bytes()) {
            debug!("Content of {} unchanged, skipping", id);
            return Ok(None);
        }

        let mut graph = self.graph.write().await;
        let updated = update_graph_for_file(&mut graph, &id, &source, self.parser.as_ref(), self.resolver.as_ref());
        let diff = match updated {
            Ok(diff) => diff,
            Err(e) => {
                drop(graph);
                warn!("Keeping previous imports of {}: {}", id, e);
                return Ok(Some(GraphEvent::ParseFailed { module: id, message: e.to_string() }));
            }
        };
        let plan = plan_rebuild(&graph, &BTreeSet::from([id.clone()]));
        drop(graph);

        log_graph_diff(&id, &diff);
        log_rebuild_plan(&plan);
        Ok(Some(GraphEvent::Changed { module: id, diff, plan }))
    }

    /// Removing a directory drops every module underneath it.
    async fn handle_removed(&self, path: &Path) -> Option<GraphEvent> {
        let id = self.module_id(path);
        let prefix = format!("{}/", id);

        let mut graph = self.graph.write().await;
        let doomed: BTreeSet<ModuleId> = graph
            .module_ids()
            .into_iter()
            .filter(|m| *m == id || m.as_str().starts_with(&prefix))
            .collect();
        if doomed.is_empty() {
            return None;
        }

        let plan = plan_rebuild(&graph, &doomed);
        for module in &doomed {
            graph.remove(module);
            self.fingerprints.forget(module);
        }
        drop(graph);

        for module in &doomed {
            log_module_removal(module);
        }
        log_rebuild_plan(&plan);
        Some(GraphEvent::Removed {
            modules: doomed.into_iter().collect(),
            plan,
        })
    }
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}
