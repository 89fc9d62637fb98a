//! Modgraph Core: module dependency graph, update engine and invalidation

pub mod model;
pub mod graph;
pub mod importees;
pub mod diff;
pub mod propagate;
pub mod cache;
pub mod config;
pub mod error;


#[cfg(test)]
pub mod test_utils;

pub use model::{ModuleId, ModuleNode, normalize_id};
pub use graph::DependencyGraph;
pub use importees::{ImportParser, Resolve, build_importee_set};
pub use diff::{GraphUpdateResult, update_graph_for_file};
pub use propagate::{RebuildPlan, affected_importers, distances_up, plan_rebuild, topo_order_up};
pub use cache::{Fingerprint, FingerprintCache, fingerprint};
pub use config::{CONFIG_FILE, ProjectConfig, config_path};
pub use error::ParseError;
