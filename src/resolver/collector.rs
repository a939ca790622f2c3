//! Transitive dependency closure over project files.
//!
//! A worklist loop with lazy edge discovery: each visited node's XML is
//! inspected for configured item kinds, every reference is resolved to an
//! absolute path and registered, and newly seen identities join the worklist.
//! The registry guarantees each identity is enqueued at most once, so the
//! loop terminates on any finite graph, cycles and self-loops included.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use petgraph::graph::NodeIndex;
use tracing::{debug, info, warn};

use crate::msbuild::{self, ItemSpec};
use crate::utils::paths::{identity_key, normalize_path};
use crate::vars::VariableTable;

use super::project_graph::ProjectGraph;

/// Result of one closure computation.
pub struct Closure {
    /// Node storage and edges; owns every discovered node.
    pub graph: ProjectGraph,
    /// Nodes whose backing file is on disk, sorted case-insensitively by
    /// path. Exactly these appear in the directory tree.
    pub existing: Vec<NodeIndex>,
    /// Referenced nodes that were never found on disk, same ordering.
    pub unknown: Vec<NodeIndex>,
}

/// Collects the dependency closure for a seed set of project files.
pub struct DependencyCollector<'a> {
    specs: &'a [ItemSpec],
    vars: &'a VariableTable,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(specs: &'a [ItemSpec], vars: &'a VariableTable) -> Self {
        Self { specs, vars }
    }

    /// Runs the closure to completion over the seed paths.
    ///
    /// Per-node failures never abort: a missing file degrades the node to
    /// unknown and skips its expansion, malformed XML is logged and treated
    /// as "no discoverable dependencies".
    pub fn collect<I>(&self, seeds: I) -> Closure
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut graph = ProjectGraph::new();
        let mut worklist = VecDeque::new();

        for seed in seeds {
            let (index, created) = graph.register(&seed);
            if created {
                worklist.push_back(index);
            }
        }

        while let Some(index) = worklist.pop_front() {
            self.visit(&mut graph, &mut worklist, index);
        }

        info!(
            projects = graph.node_count(),
            dependencies = graph.edge_count(),
            "dependency closure complete"
        );

        Self::finish(graph)
    }

    /// Discovers the outgoing edges of one node.
    fn visit(
        &self,
        graph: &mut ProjectGraph,
        worklist: &mut VecDeque<NodeIndex>,
        index: NodeIndex,
    ) {
        let (path, exists) = {
            let node = graph.node(index);
            (node.path.clone(), node.exists)
        };

        if !exists {
            warn!("project [{}] not found, skipping dependency inspection", path.display());
            return;
        }

        let Some(content) = msbuild::read_project_xml(&path) else {
            return;
        };
        let Some(doc) = msbuild::parse_project_xml(&path, &content) else {
            return;
        };

        let node_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for spec in self.specs {
            for raw in spec.matching_values(&doc) {
                let dep_path = resolve_reference(&node_dir, &raw, self.vars);
                let (dep_index, created) = graph.register(&dep_path);
                if created {
                    debug!("discovered [{}] via [{}]", dep_path.display(), path.display());
                    worklist.push_back(dep_index);
                }
                graph.add_dependency(index, dep_index);
            }
        }
    }

    /// Partitions processed nodes and assigns sequence numbers.
    ///
    /// Numbering happens only here, over a deterministic final sort; it is
    /// injective and stable for one run, nothing more.
    fn finish(mut graph: ProjectGraph) -> Closure {
        let mut all = graph.node_indices();
        all.sort_by_key(|&i| identity_key(&graph.node(i).path));

        for (sequence, &index) in all.iter().enumerate() {
            graph.node_mut(index).sequence = Some(sequence);
        }

        let (existing, unknown) = all.into_iter().partition(|&i| graph.node(i).exists);
        Closure { graph, existing, unknown }
    }
}

/// Resolves a raw dependency reference to a file-system path.
///
/// Fallback chain, in order:
/// 1. already absolute: normalize and return;
/// 2. relative to the referencing project's directory, if that file exists;
/// 3. after variable resolution, if the resolved string names a file;
/// 4. otherwise the raw reference unchanged, which downstream degrades to an
///    unknown node.
///
/// The chain is a heuristic for framework-style symbolic paths without a full
/// variable-scoping model; step 4 intentionally does not flag the miss.
#[must_use]
pub fn resolve_reference(node_dir: &Path, raw: &str, vars: &VariableTable) -> PathBuf {
    let raw_path = Path::new(raw);
    if raw_path.is_absolute() {
        return normalize_path(raw_path);
    }

    let joined = node_dir.join(raw_path);
    if joined.is_file() {
        return normalize_path(&joined);
    }

    let resolved = vars.resolve(raw);
    let resolved_path = Path::new(&resolved);
    if resolved_path.is_file() {
        return crate::utils::paths::absolutize(resolved_path)
            .unwrap_or_else(|_| normalize_path(resolved_path));
    }

    raw_path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msbuild::ItemKind;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn import_spec() -> Vec<ItemSpec> {
        vec![ItemSpec::new::<&str>(ItemKind::Import, &[])]
    }

    fn collect(seeds: Vec<PathBuf>, specs: &[ItemSpec]) -> Closure {
        let vars = VariableTable::default();
        DependencyCollector::new(specs, &vars).collect(seeds)
    }

    #[test]
    fn test_two_projects_one_edge() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", r#"<P><Import Project="b.proj"/></P>"#);
        write(temp.path(), "b.proj", "<P></P>");

        let closure = collect(vec![a.clone()], &import_spec());
        assert_eq!(closure.existing.len(), 2);
        assert!(closure.unknown.is_empty());
        assert_eq!(closure.graph.edge_count(), 1);

        // a depends on b
        let a_idx = closure.existing[0];
        assert!(closure.graph.node(a_idx).path.ends_with("a.proj"));
        let deps = closure.graph.dependencies(a_idx);
        assert_eq!(deps.len(), 1);
        assert!(closure.graph.node(deps[0]).path.ends_with("b.proj"));
    }

    #[test]
    fn test_cycle_terminates() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", r#"<P><Import Project="b.proj"/></P>"#);
        write(temp.path(), "b.proj", r#"<P><Import Project="a.proj"/></P>"#);

        let closure = collect(vec![a], &import_spec());
        assert_eq!(closure.existing.len(), 2);
        assert_eq!(closure.graph.edge_count(), 2);
    }

    #[test]
    fn test_self_loop_terminates() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", r#"<P><Import Project="a.proj"/></P>"#);

        let closure = collect(vec![a], &import_spec());
        assert_eq!(closure.existing.len(), 1);
        assert_eq!(closure.graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_dependency_is_unknown_and_not_expanded() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", r#"<P><Import Project="ghost.props"/></P>"#);

        let closure = collect(vec![a], &import_spec());
        assert_eq!(closure.existing.len(), 1);
        assert_eq!(closure.unknown.len(), 1);
        let ghost = closure.unknown[0];
        assert!(closure.graph.dependencies(ghost).is_empty());
    }

    #[test]
    fn test_no_dependencies_is_existing_with_empty_edges() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", "<P></P>");

        let closure = collect(vec![a], &import_spec());
        assert_eq!(closure.existing.len(), 1);
        assert!(closure.unknown.is_empty());
        assert_eq!(closure.graph.edge_count(), 0);
    }

    #[test]
    fn test_malformed_xml_contained() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", r#"<P><Import Project="b.proj"/></P>"#);
        write(temp.path(), "b.proj", "<P><broken");

        let closure = collect(vec![a], &import_spec());
        // b exists but contributes no further dependencies
        assert_eq!(closure.existing.len(), 2);
        assert_eq!(closure.graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_seeds_deduplicated() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", "<P></P>");

        let closure = collect(vec![a.clone(), a], &import_spec());
        assert_eq!(closure.existing.len(), 1);
    }

    #[test]
    fn test_mask_restricts_collection() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(
            temp.path(),
            "a.proj",
            r#"<P><Import Project="bar.props"/><Import Project="foo.targets"/></P>"#,
        );
        write(temp.path(), "bar.props", "<P></P>");
        write(temp.path(), "foo.targets", "<P></P>");

        let specs = vec![ItemSpec::new(ItemKind::Import, &[".props"])];
        let closure = collect(vec![a], &specs);
        assert_eq!(closure.graph.node_count(), 2);
        assert!(closure.existing.iter().any(|&i| closure.graph.node(i).path.ends_with("bar.props")));
        assert!(!closure.existing.iter().any(|&i| closure.graph.node(i).path.ends_with("foo.targets")));
    }

    #[test]
    fn test_sequence_numbers_injective() {
        let temp = tempfile::tempdir().unwrap();
        let a = write(temp.path(), "a.proj", r#"<P><Import Project="b.proj"/><Import Project="ghost.props"/></P>"#);
        write(temp.path(), "b.proj", "<P></P>");

        let closure = collect(vec![a], &import_spec());
        let mut seen: Vec<usize> = closure
            .existing
            .iter()
            .chain(&closure.unknown)
            .map(|&i| closure.graph.node(i).sequence.unwrap())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_resolve_reference_chain() {
        let temp = tempfile::tempdir().unwrap();
        let existing = write(temp.path(), "dep.props", "<P></P>");

        let vars = VariableTable::from_pairs([("$(Root)", temp.path().to_string_lossy())]);

        // 1: absolute wins outright, even when missing
        let abs = resolve_reference(temp.path(), "/opt/x/dep.props", &vars);
        assert_eq!(abs, PathBuf::from("/opt/x/dep.props"));

        // 2: relative to the project dir when present on disk
        let rel = resolve_reference(temp.path(), "dep.props", &vars);
        assert_eq!(rel, normalize_path(&existing));

        // 3: variable resolution as the fallback
        let via_var = resolve_reference(Path::new("/elsewhere"), "$(Root)/dep.props", &vars);
        assert_eq!(via_var, normalize_path(&existing));

        // 4: unresolved literal comes back unchanged
        let miss = resolve_reference(Path::new("/elsewhere"), "$(Nope)/dep.props", &vars);
        assert_eq!(miss, PathBuf::from("$(Nope)/dep.props"));
    }
}
