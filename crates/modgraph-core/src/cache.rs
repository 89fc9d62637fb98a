//! Content fingerprints used to skip redundant graph updates

use crate::model::ModuleId;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// SHA-256 fingerprint of module content.
pub type Fingerprint = [u8; 32];

/// Last observed content fingerprint per module. Thread-safe for concurrent access.
///
/// This is an admission filter only: skipping an update because the content is
/// unchanged is an optimization, never a correctness requirement.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    entries: DashMap<ModuleId, Fingerprint>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        FingerprintCache {
            entries: DashMap::new(),
        }
    }

    /// Compare `content` against the last fingerprint recorded for `id`.
    ///
    /// The new fingerprint is recorded whatever the outcome. A module seen for
    /// the first time counts as changed.
    pub fn has_changed(&self, id: &ModuleId, content: &[u8]) -> bool {
        let next = fingerprint(content);
        match self.entries.insert(id.clone(), next) {
            Some(previous) => previous != next,
            None => true,
        }
    }

    /// Drop the record for a module that left the graph.
    pub fn forget(&self, id: &ModuleId) {
        self.entries.remove(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the fingerprint of a byte buffer.
pub fn fingerprint(content: &[u8]) -> Fingerprint {
    Sha256::digest(content).into()
}
