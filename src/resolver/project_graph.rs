//! Identity registry and dependency graph for one closure computation.
//!
//! The graph owns every [`ProjectNode`] discovered during a run; edges are
//! petgraph indices into it, never owning references, so cyclic dependency
//! structures are representable without any recursion hazard. Identity is the
//! case-folded normalized absolute path, and the registry guarantees at most
//! one node per identity for the lifetime of the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::utils::paths::{identity_key, normalize_path};

/// One build-description file discovered during closure computation.
#[derive(Debug, Clone)]
pub struct ProjectNode {
    /// Normalized path, original casing preserved for display.
    pub path: PathBuf,
    /// Whether the backing file was present when the node was registered.
    /// Checked once and cached; nodes without a backing file are never
    /// expanded for further dependencies.
    pub exists: bool,
    /// Injective numbering assigned only after closure completes; used as the
    /// rendering node key. Stable for one run, meaningless across runs.
    pub sequence: Option<usize>,
}

impl ProjectNode {
    /// The file name, for diagram labels.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// The containing directory.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// Rendering key, available after sequence numbers are assigned.
    #[must_use]
    pub fn render_id(&self) -> String {
        format!("node{}", self.sequence.unwrap_or_default())
    }
}

/// Identity-keyed registry plus dependency edges.
pub struct ProjectGraph {
    graph: DiGraph<ProjectNode, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl ProjectGraph {
    #[must_use]
    pub fn new() -> Self {
        Self { graph: DiGraph::new(), node_map: HashMap::new() }
    }

    /// Registers a path, returning the existing node for an already-seen
    /// identity or creating a new one. The boolean is true when the node was
    /// newly created.
    ///
    /// Registration never inspects the file's content; dependency discovery
    /// is deferred to the collector's visit.
    pub fn register(&mut self, path: &Path) -> (NodeIndex, bool) {
        let key = identity_key(path);
        if let Some(&index) = self.node_map.get(&key) {
            return (index, false);
        }

        let path = normalize_path(path);
        let exists = path.is_file();
        let index = self.graph.add_node(ProjectNode { path, exists, sequence: None });
        self.node_map.insert(key, index);
        (index, true)
    }

    /// Adds a dependency edge. Duplicate additions are no-ops.
    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.graph.contains_edge(from, to) {
            debug!(
                "project [{}] already present as dependency for [{}]",
                self.graph[to].path.display(),
                self.graph[from].path.display()
            );
            return;
        }
        self.graph.add_edge(from, to, ());
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &ProjectNode {
        &self.graph[index]
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut ProjectNode {
        &mut self.graph[index]
    }

    /// Direct dependencies of a node, sorted by identity for deterministic
    /// output. Traversal order during closure is unspecified; only final
    /// results are ordered.
    #[must_use]
    pub fn dependencies(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<_> = self.graph.neighbors(index).collect();
        deps.sort_by_key(|&d| identity_key(&self.graph[d].path));
        deps
    }

    /// Every registered node, in arbitrary order.
    #[must_use]
    pub fn node_indices(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for ProjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
