//! Dependency graph backed by petgraph::StableDiGraph with a ModuleId side index

use crate::model::{ModuleId, ModuleNode};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// The module dependency graph.
///
/// An edge `a -> b` means module `a` imports module `b`. Nodes live in an arena
/// with stable handles; `index` maps each id to its handle. Edge symmetry is
/// structural: an edge is stored once and read from either end.
///
/// Every read returns a detached copy. The graph assumes a single writer and
/// does no internal locking.
pub struct DependencyGraph {
    inner: StableDiGraph<ModuleId, ()>,
    index: HashMap<ModuleId, NodeIndex>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Look up a node without creating it.
    pub fn get_node(&self, id: &ModuleId) -> Option<ModuleNode> {
        self.index.get(id).map(|&idx| self.snapshot(idx))
    }

    /// Look up a node, creating an edge-less one if absent.
    pub fn ensure_node(&mut self, id: &ModuleId) -> ModuleNode {
        let idx = self.slot(id);
        self.snapshot(idx)
    }

    /// Whether a node exists for `id`.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.index.contains_key(id)
    }

    /// Add the edge `importer -> importee`, creating either endpoint if needed.
    /// Linking an existing edge is a no-op.
    pub fn link(&mut self, importer: &ModuleId, importee: &ModuleId) {
        let from = self.slot(importer);
        let to = self.slot(importee);
        if self.inner.find_edge(from, to).is_none() {
            self.inner.add_edge(from, to, ());
        }
    }

    /// Remove the edge `importer -> importee`. Missing endpoints or a missing
    /// edge make this a no-op.
    pub fn unlink(&mut self, importer: &ModuleId, importee: &ModuleId) {
        let (Some(&from), Some(&to)) = (self.index.get(importer), self.index.get(importee)) else {
            return;
        };
        if let Some(edge) = self.inner.find_edge(from, to) {
            self.inner.remove_edge(edge);
        }
    }

    /// Set the importees of `id` to exactly `next`.
    ///
    /// Only the symmetric difference is touched: stale edges are unlinked, new
    /// ones linked, and the graph is consistent between every single step.
    /// Reached only through `update_graph_for_file` so each outgoing-edge change
    /// is reported as a diff.
    pub(crate) fn replace_importees(&mut self, id: &ModuleId, next: &BTreeSet<ModuleId>) {
        self.slot(id);
        let current = self.importees_of(id);

        for stale in current.difference(next) {
            self.unlink(id, stale);
        }
        for fresh in next.difference(&current) {
            self.link(id, fresh);
        }
    }

    /// Remove a node together with every edge touching it.
    ///
    /// Returns the node as it was just before removal.
    pub fn remove(&mut self, id: &ModuleId) -> Option<ModuleNode> {
        let idx = *self.index.get(id)?;
        let removed = self.snapshot(idx);

        for importer in &removed.importers {
            self.unlink(importer, id);
        }
        for importee in &removed.importees {
            self.unlink(id, importee);
        }

        self.index.remove(id);
        self.inner.remove_node(idx);
        Some(removed)
    }

    /// Copy of the modules importing `id`. Empty when `id` is absent.
    pub fn importers_of(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Copy of the modules imported by `id`. Empty when `id` is absent.
    pub fn importees_of(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Every module that transitively imports `id`, excluding `id` itself.
    pub fn ancestors_of(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        self.closure(id, Direction::Incoming)
    }

    /// Every module transitively imported by `id`, excluding `id` itself.
    pub fn descendants_of(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        self.closure(id, Direction::Outgoing)
    }

    /// Total number of modules.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of import edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Sorted snapshot of every module id in the graph.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.index.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn slot(&mut self, id: &ModuleId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.inner.add_node(id.clone());
        self.index.insert(id.clone(), idx);
        idx
    }

    fn snapshot(&self, idx: NodeIndex) -> ModuleNode {
        ModuleNode {
            id: self.inner[idx].clone(),
            importees: self.ids_around(idx, Direction::Outgoing).collect(),
            importers: self.ids_around(idx, Direction::Incoming).collect(),
        }
    }

    fn ids_around(&self, idx: NodeIndex, dir: Direction) -> impl Iterator<Item = ModuleId> + '_ {
        self.inner
            .neighbors_directed(idx, dir)
            .map(move |n| self.inner[n].clone())
    }

    fn neighbors(&self, id: &ModuleId, dir: Direction) -> BTreeSet<ModuleId> {
        match self.index.get(id) {
            Some(&idx) => self.ids_around(idx, dir).collect(),
            None => BTreeSet::new(),
        }
    }

    /// Work-list traversal guarded by a visited set, so shared nodes and cycles
    /// are settled once.
    fn closure(&self, id: &ModuleId, dir: Direction) -> BTreeSet<ModuleId> {
        let Some(&start) = self.index.get(id) else {
            return BTreeSet::new();
        };

        let mut visited = HashSet::from([start]);
        let mut stack: Vec<NodeIndex> = self.inner.neighbors_directed(start, dir).collect();
        let mut found = BTreeSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            found.insert(self.inner[current].clone());
            stack.extend(
                self.inner
                    .neighbors_directed(current, dir)
                    .filter(|n| !visited.contains(n)),
            );
        }

        tracing::debug!(module = %id, ?dir, reached = found.len(), "closure computed");
        found
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
