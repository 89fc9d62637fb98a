//! Core data structures for the module graph

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Canonical key for a module: a normalized absolute path or a virtual id.
///
/// Two ids are equal iff their canonical strings are byte-equal. Producing the
/// canonical form is the job of [`normalize_id`], not of the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        ModuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the id as a filesystem path.
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// File extension including the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit('/').next()?;
        name.rfind('.').filter(|&i| i > 0).map(|i| &name[i..])
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        ModuleId(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        ModuleId(id)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Detached snapshot of one module's position in the graph.
///
/// Mutating a snapshot never touches the graph it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: ModuleId,
    /// Modules this one currently imports.
    pub importees: BTreeSet<ModuleId>,
    /// Modules that currently import this one.
    pub importers: BTreeSet<ModuleId>,
}

/// Build a canonical [`ModuleId`] from a raw watcher or resolver path.
///
/// Relative paths are joined onto `root`, backslashes become forward slashes and
/// `.`/`..` segments are folded lexically. The filesystem is never consulted.
pub fn normalize_id(raw: &str, root: &Path) -> ModuleId {
    let raw = raw.replace('\\', "/");
    let joined = if Path::new(&raw).is_absolute() {
        raw
    } else {
        root.join(&raw).to_string_lossy().replace('\\', "/")
    };

    let absolute = joined.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().map_or(!absolute, |last| *last == "..") {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if absolute {
        ModuleId(format!("/{body}"))
    } else {
        ModuleId(body)
    }
}
