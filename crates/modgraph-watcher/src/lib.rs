//! Filesystem watching and the single-writer graph update loop

pub mod watcher;
pub mod service;
pub mod scan;
pub mod report;


pub use watcher::{FileWatcher, PathFilter, WatchEvent, translate_event};
pub use service::{GraphEvent, WatcherService};
pub use scan::{ScanSummary, initial_scan};
