//! Relative specifier resolution (`./foo`, `../bar`) against the filesystem

use modgraph_core::{ModuleId, ProjectConfig, Resolve, normalize_id};
use std::path::Path;

/// Resolves relative specifiers to normalized absolute module ids.
///
/// Bare specifiers (`react`, `node:fs`) are left to other strategies and
/// resolve to `None`.
#[derive(Debug, Clone)]
pub struct RelativeResolver {
    extensions: Vec<String>,
}

impl RelativeResolver {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.extensions.clone())
    }
}

impl Default for RelativeResolver {
    fn default() -> Self {
        Self::from_config(&ProjectConfig::default())
    }
}

impl Resolve for RelativeResolver {
    fn resolve(&self, specifier: &str, importer: &ModuleId) -> Option<ModuleId> {
        if !specifier.starts_with('.') {
            return None;
        }

        let importer_path = importer.to_path();
        let dir = importer_path.parent().unwrap_or(Path::new("/"));
        let base = normalize_id(specifier, dir);

        if is_file(base.as_str()) {
            return Some(base);
        }

        // Try appending each supported extension.
        for ext in &self.extensions {
            let candidate = format!("{}{}", base, ext);
            if is_file(&candidate) {
                return Some(ModuleId::from(candidate));
            }
        }

        // Fall back to an index file inside the target directory.
        for ext in &self.extensions {
            let candidate = format!("{}/index{}", base, ext);
            if is_file(&candidate) {
                return Some(ModuleId::from(candidate));
            }
        }

        None
    }
}

fn is_file(path: &str) -> bool {
    Path::new(path).is_file()
}
