//! Minimal directory-grouping tree for diagram layout.
//!
//! Given the existing projects sorted case-insensitively by path, this builds
//! the minimal branching skeleton of their directory hierarchy in one
//! left-to-right pass: a node exists only for the common ancestor root and
//! for directories actually needed to separate sibling subtrees. The tree is
//! stored as an arena of [`DirNode`] with index handles; the builder keeps a
//! "current branch" (root-to-tip stack of handles) so each directory level is
//! pushed and popped close to once overall, instead of re-descending from the
//! root per insertion.

use std::path::{Path, PathBuf};

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::resolver::ProjectGraph;
use crate::utils::paths::{common_ancestor, is_ancestor_of, path_eq_ci};

/// Handle to a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirId(usize);

/// One directory level of the grouping tree.
#[derive(Debug)]
pub struct DirNode {
    pub path: PathBuf,
    pub parent: Option<DirId>,
    pub children: Vec<DirId>,
    /// Projects located directly in this directory.
    pub items: Vec<NodeIndex>,
}

/// The built grouping tree. Node 0 is always the root.
pub struct DirectoryTree {
    nodes: Vec<DirNode>,
    branch: Vec<DirId>,
}

impl DirectoryTree {
    /// Builds the tree over the sorted existing projects.
    ///
    /// Returns `None` for an empty input. The root directory is the common
    /// ancestor of all project paths; for a single project it is that
    /// project's parent directory.
    pub fn build(graph: &ProjectGraph, existing: &[NodeIndex]) -> Option<Self> {
        let first = *existing.first()?;

        let root_dir = if existing.len() == 1 {
            graph.node(first).directory()
        } else {
            existing
                .iter()
                .map(|&i| graph.node(i).path.clone())
                .reduce(|a, b| common_ancestor(&a, &b))
                .unwrap_or_default()
        };

        let mut tree = Self { nodes: Vec::new(), branch: Vec::new() };
        tree.push_node(root_dir);

        for &project in existing {
            let dir = graph.node(project).directory();
            tree.insert(project, &dir);
        }

        Some(tree)
    }

    /// Places one project, growing or truncating the branch as needed.
    fn insert(&mut self, project: NodeIndex, dir: &Path) {
        let tip_dir = self.node(self.tip()).path.clone();

        if path_eq_ci(dir, &tip_dir) {
            self.attach(project);
            return;
        }

        if !is_ancestor_of(&tip_dir, dir) {
            // the project lives in another sub-branch
            let common = common_ancestor(dir, &tip_dir);
            self.truncate_to(&common);
        }

        self.grow_to(dir);
        self.attach(project);
    }

    /// Extends the branch from the tip down to `dir`, creating intermediate
    /// ancestor levels between tip and `dir` along the way.
    fn grow_to(&mut self, dir: &Path) {
        let tip_dir = self.node(self.tip()).path.clone();
        if path_eq_ci(dir, &tip_dir) {
            // already at this level, nothing to grow
            return;
        }

        let mut pending = vec![dir.to_path_buf()];
        let mut cursor = dir.to_path_buf();
        while let Some(parent) = cursor.parent().map(Path::to_path_buf) {
            if path_eq_ci(&parent, &tip_dir) {
                break;
            }
            pending.push(parent.clone());
            cursor = parent;
        }

        while let Some(level) = pending.pop() {
            self.push_node(level);
        }
    }

    /// Pops branch levels until the tip is `dir`. Popped nodes stay in the
    /// arena; only the branch forgets them.
    fn truncate_to(&mut self, dir: &Path) {
        while self.branch.len() > 1 && !path_eq_ci(&self.node(self.tip()).path, dir) {
            self.branch.pop();
        }
    }

    fn push_node(&mut self, path: PathBuf) {
        debug!("directory tree level [{}]", path.display());
        let id = DirId(self.nodes.len());
        let parent = self.branch.last().copied();
        self.nodes.push(DirNode { path, parent, children: Vec::new(), items: Vec::new() });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.branch.push(id);
    }

    fn attach(&mut self, project: NodeIndex) {
        let tip = self.tip();
        self.nodes[tip.0].items.push(project);
    }

    fn tip(&self) -> DirId {
        // branch is never empty after construction
        *self.branch.last().unwrap_or(&DirId(0))
    }

    /// The root handle.
    #[must_use]
    pub fn root(&self) -> DirId {
        DirId(0)
    }

    #[must_use]
    pub fn node(&self, id: DirId) -> &DirNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
