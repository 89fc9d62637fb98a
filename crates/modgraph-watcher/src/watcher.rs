//! Filesystem watcher implementation

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use modgraph_core::ProjectConfig;
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the file watcher. Paths are raw and not yet normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File or directory created
    Added(PathBuf),
    /// File or directory modified
    Changed(PathBuf),
    /// File or directory removed
    Removed(PathBuf),
    /// All requested paths are being watched
    Ready,
}

impl WatchEvent {
    /// The path carried by the event, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Added(path) | WatchEvent::Changed(path) | WatchEvent::Removed(path) => {
                Some(path.as_path())
            }
            WatchEvent::Ready => None,
        }
    }
}

/// Map a notify event onto watch events.
///
/// Renames become a removal of the old path and an addition of the new one.
/// Backends that cannot tell the two ends apart report `RenameMode::Any`; the
/// path's existence decides which end it was.
pub fn translate_event(event: notify::Event) -> Vec<WatchEvent> {
    let mut paths = event.paths.into_iter();
    match event.kind {
        EventKind::Create(_) => paths.map(WatchEvent::Added).collect(),
        EventKind::Remove(_) => paths.map(WatchEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.map(WatchEvent::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.map(WatchEvent::Added).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut events: Vec<WatchEvent> = paths.next().map(WatchEvent::Removed).into_iter().collect();
            events.extend(paths.map(WatchEvent::Added));
            events
        }
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|path| {
                if path.exists() {
                    WatchEvent::Added(path)
                } else {
                    WatchEvent::Removed(path)
                }
            })
            .collect(),
        EventKind::Modify(_) => paths.map(WatchEvent::Changed).collect(),
        _ => Vec::new(),
    }
}

/// Decides which paths reach the graph: ignore globs plus module extensions.
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignore: GlobSet,
    config: ProjectConfig,
}

impl PathFilter {
    pub fn new(config: &ProjectConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            ignore: builder.build()?,
            config: config.clone(),
        })
    }

    /// Check if a path matches one of the ignore patterns
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.is_match(path)
    }

    /// Check if a path is a module file we should process
    pub fn is_module(&self, path: &Path) -> bool {
        !self.is_ignored(path) && self.config.is_module_path(path)
    }
}

/// File system watcher feeding a typed event stream
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl FileWatcher {
    /// Create a new file watcher dropping paths rejected by `filter`
    pub fn new(filter: PathFilter) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let event_tx_clone = event_tx.clone();
        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => {
                    debug!("File system event: {:?}", event);
                    Self::handle_notify_event(event, &filter, &event_tx_clone);
                }
                Err(e) => {
                    error!("File system watch error: {}", e);
                }
            }
        })?;

        Ok(Self {
            watcher,
            event_tx,
            event_rx,
        })
    }

    /// Forward the watch events for one notify event, minus ignored paths
    fn handle_notify_event(
        event: notify::Event,
        filter: &PathFilter,
        event_tx: &mpsc::UnboundedSender<WatchEvent>,
    ) {
        for watch_event in translate_event(event) {
            if let Some(path) = watch_event.path() {
                if filter.is_ignored(path) {
                    continue;
                }
            }
            if let Err(e) = event_tx.send(watch_event) {
                warn!("Failed to send watch event: {}", e);
            }
        }
    }

    /// Watch a directory recursively
    pub fn watch_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Watching directory: {:?}", path);

        self.watcher.watch(path, RecursiveMode::Recursive)?;
        Ok(())
    }

    /// Signal that every root is registered. notify has no ready event of its own.
    pub fn mark_ready(&self) {
        if let Err(e) = self.event_tx.send(WatchEvent::Ready) {
            warn!("Failed to send ready event: {}", e);
        }
    }

    /// Get the event receiver
    pub fn event_receiver(&mut self) -> &mut mpsc::UnboundedReceiver<WatchEvent> {
        &mut self.event_rx
    }
}
