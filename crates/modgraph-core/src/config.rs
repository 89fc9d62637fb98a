//! Project configuration loaded from `modgraph.toml`

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up at the project root.
pub const CONFIG_FILE: &str = "modgraph.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Module the initial scan starts from.
    pub entry: PathBuf,
    /// Directories handed to the filesystem watcher.
    pub roots: Vec<PathBuf>,
    /// Extensions treated as modules and probed by the resolver, with leading dot.
    pub extensions: Vec<String>,
    /// Glob patterns for paths the watcher drops.
    pub ignore: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            entry: PathBuf::from("src/index.ts"),
            roots: vec![PathBuf::from("src")],
            extensions: [".ts", ".tsx", ".js", ".jsx"].map(String::from).to_vec(),
            ignore: ["**/node_modules/**", "**/.git/**", "**/target/**", "**/dist/**"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ProjectConfig {
    /// Load `<root>/modgraph.toml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = config_path(root);
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: ProjectConfig =
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Whether a path has one of the configured module extensions.
    pub fn is_module_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known.trim_start_matches('.') == ext))
    }
}

/// Get config file path
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}
