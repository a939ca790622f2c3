//! Diagram assembly: projects, directory clusters, dependency edges.
//!
//! Walks the directory tree depth-first, opening one cluster per tree node,
//! emits one rendering node per existing project colored by its declared
//! output type, one node per unknown project in a distinct dashed-red style
//! outside all clusters, and one edge per dependency relation subject to the
//! two suppression filters (`--ignore-std-proj` and `--ignore-deps`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::core::PdvError;
use crate::msbuild;
use crate::resolver::{Closure, ProjectNode};
use crate::tree::{DirId, DirectoryTree};

use super::dot::{DotBuilder, subgraph_id};

/// Output-shaping options for one diagram.
#[derive(Debug, Clone)]
pub struct DiagramOptions {
    /// Graph name used in the DOT source.
    pub name: String,
    /// Comment placed on the first line of the source.
    pub comment: String,
    /// Label drawn above the image.
    pub label: String,
    /// File name of the emitted DOT source.
    pub filename: String,
    /// Directory the source (and any rendering) is written into.
    pub directory: PathBuf,
    /// Rendering format passed to the layout engine (`svg`, `png`, ...).
    pub format: String,
    /// Layout engine executable (`dot`, `neato`, ...).
    pub engine: String,
    /// Invoke the layout engine after saving the source.
    pub render: bool,
    /// Drop the `cluster_` prefix so directories are not drawn as boxes.
    pub hide_paths: bool,
    /// Suppress edges to standard MSBuild boilerplate imports.
    pub ignore_std: bool,
    /// Suffix filters suppressing edges to/from matching projects.
    pub ignore_deps: Vec<String>,
}

const UNKNOWN_COLOR: &str = "red";

/// Color for a project's declared output types.
///
/// Multiple distinct types select the "mixed" color; absent type data selects
/// the default. The names are X11 color names Graphviz understands.
#[must_use]
pub fn output_type_color(types: Option<&BTreeSet<String>>) -> &'static str {
    const DEFAULT: &str = "brown";
    const MIXED: &str = "orangered";

    let Some(types) = types else {
        return DEFAULT;
    };
    if types.len() > 1 {
        return MIXED;
    }
    let Some(only) = types.iter().next() else {
        return DEFAULT;
    };
    match only.to_lowercase().as_str() {
        // *.vcxproj ConfigurationType values
        "dynamiclibrary" => "blue",
        "driver" => "magenta",
        "staticlibrary" => "deepskyblue",
        "application" => "limegreen",
        // *.csproj OutputType values
        "library" => "cornflowerblue",
        "module" => "darkviolet",
        "exe" => "green",
        "winexe" => "greenyellow",
        _ => DEFAULT,
    }
}

/// Writes the diagram for one closure result.
pub struct DiagramPrinter<'a> {
    closure: &'a Closure,
    tree: Option<&'a DirectoryTree>,
    options: &'a DiagramOptions,
}

impl<'a> DiagramPrinter<'a> {
    pub fn new(
        closure: &'a Closure,
        tree: Option<&'a DirectoryTree>,
        options: &'a DiagramOptions,
    ) -> Self {
        Self { closure, tree, options }
    }

    /// Builds the complete DOT source.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut builder = DotBuilder::new(&self.options.name, &self.options.comment);
        builder
            .graph_attrs(&[
                ("rankdir", "LR"),
                ("style", "dotted, bold"),
                ("color", "grey"),
                ("fontcolor", "darkgreen"),
                ("fontsize", "16"),
                ("labelloc", "t"),
                ("label", self.options.label.as_str()),
            ])
            .node_defaults(&[
                ("shape", "box"),
                ("style", "filled, rounded"),
                ("color", "brown"),
                ("fillcolor", "beige"),
                ("penwidth", "2"),
            ])
            .edge_defaults(&[("color", "brown")]);

        self.write_edges(&mut builder);

        if let Some(tree) = self.tree {
            let root_path = display_path(&tree.node(tree.root()).path);
            self.write_directory(&mut builder, tree, tree.root(), &root_path);
        }

        self.write_unknown(&mut builder);

        builder.finish()
    }

    /// One edge per dependency relation, filters applied.
    fn write_edges(&self, builder: &mut DotBuilder) {
        for &from in &self.closure.existing {
            let project = self.closure.graph.node(from);
            if self.should_ignore(project) {
                continue;
            }

            for to in self.closure.graph.dependencies(from) {
                let dependency = self.closure.graph.node(to);
                if self.should_ignore(dependency) {
                    continue;
                }
                if self.options.ignore_std && msbuild::is_standard_project(&dependency.file_name())
                {
                    debug!("suppressing standard dependency [{}]", dependency.file_name());
                    continue;
                }

                let color = if dependency.exists {
                    output_type_color(msbuild::output_types(&dependency.path).as_ref())
                } else {
                    UNKNOWN_COLOR
                };
                let tooltip = format!("{} -> {}", project.file_name(), dependency.file_name());
                builder.edge(
                    &project.render_id(),
                    &dependency.render_id(),
                    &[("tooltip", tooltip.as_str()), ("color", color)],
                );
            }
        }
    }

    /// Depth-first cluster per directory tree node.
    fn write_directory(
        &self,
        builder: &mut DotBuilder,
        tree: &DirectoryTree,
        id: DirId,
        root_path: &str,
    ) {
        let node = tree.node(id);
        let path = display_path(&node.path);

        // full path only on the root label; children are relative to it
        let label = if path == root_path {
            format!("{path}/")
        } else {
            let relative = path
                .strip_prefix(root_path)
                .map(|s| s.trim_start_matches('/'))
                .unwrap_or(&path);
            format!("{relative}/")
        };

        builder.begin_subgraph(&subgraph_id(&path, !self.options.hide_paths), &label);

        for &item in &node.items {
            let project = self.closure.graph.node(item);
            let color = output_type_color(msbuild::output_types(&project.path).as_ref());
            let label = project.file_name();
            let tooltip = display_path(&project.path);
            builder.node(
                &project.render_id(),
                &[
                    ("label", label.as_str()),
                    ("color", color),
                    ("tooltip", tooltip.as_str()),
                ],
            );
        }

        for &child in &node.children {
            self.write_directory(builder, tree, child, root_path);
        }

        builder.end_subgraph();
    }

    /// Unknown projects, outside any cluster, dashed and alert-colored.
    fn write_unknown(&self, builder: &mut DotBuilder) {
        for &index in &self.closure.unknown {
            let project = self.closure.graph.node(index);
            let label = display_path(&project.path);
            builder.node(
                &project.render_id(),
                &[
                    ("label", label.as_str()),
                    ("shape", "box"),
                    ("style", "dashed"),
                    ("color", UNKNOWN_COLOR),
                ],
            );
        }
    }

    fn should_ignore(&self, project: &ProjectNode) -> bool {
        let path = project.path.to_string_lossy().to_lowercase();
        self.options.ignore_deps.iter().any(|suffix| path.ends_with(&suffix.to_lowercase()))
    }

    /// Writes the DOT source to the configured location, rendering it with
    /// the layout engine when requested. Returns the source path.
    pub fn emit(&self) -> Result<PathBuf, PdvError> {
        let dot = self.to_dot();

        std::fs::create_dir_all(&self.options.directory)?;
        let out_path = self.options.directory.join(&self.options.filename);
        std::fs::write(&out_path, &dot)?;
        info!("graph source saved to {}", out_path.display());

        if self.options.render {
            self.render(&out_path)?;
        }

        Ok(out_path)
    }

    fn render(&self, source: &Path) -> Result<(), PdvError> {
        let engine = which::which(&self.options.engine).map_err(|source| {
            PdvError::EngineNotFound { engine: self.options.engine.clone(), source }
        })?;

        let status = Command::new(&engine)
            .arg(format!("-T{}", self.options.format))
            .arg("-O")
            .arg(source)
            .status()?;
        if !status.success() {
            return Err(PdvError::RenderFailed { engine: self.options.engine.clone(), status });
        }
        info!("rendered {} with {}", source.display(), self.options.engine);
        Ok(())
    }
}

/// Path with forward slashes, for labels and tooltips.
fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msbuild::{ItemKind, ItemSpec};
    use crate::resolver::DependencyCollector;
    use crate::vars::VariableTable;
    use std::fs;

    fn options() -> DiagramOptions {
        DiagramOptions {
            name: "Dependencies".into(),
            comment: "Dependencies for projects".into(),
            label: "Dependencies".into(),
            filename: "project_dependencies.gv".into(),
            directory: PathBuf::from(".out"),
            format: "svg".into(),
            engine: "dot".into(),
            render: false,
            hide_paths: false,
            ignore_std: false,
            ignore_deps: Vec::new(),
        }
    }

    fn closure_for(seeds: Vec<PathBuf>) -> Closure {
        let specs = vec![ItemSpec::new::<&str>(ItemKind::Import, &[])];
        let vars = VariableTable::default();
        DependencyCollector::new(&specs, &vars).collect(seeds)
    }

    #[test]
    fn test_mixed_and_default_colors() {
        assert_eq!(output_type_color(None), "brown");

        let single: BTreeSet<String> = ["StaticLibrary".to_string()].into();
        assert_eq!(output_type_color(Some(&single)), "deepskyblue");

        let mixed: BTreeSet<String> =
            ["Application".to_string(), "StaticLibrary".to_string()].into();
        assert_eq!(output_type_color(Some(&mixed)), "orangered");

        let odd: BTreeSet<String> = ["Utility".to_string()].into();
        assert_eq!(output_type_color(Some(&odd)), "brown");
    }

    #[test]
    fn test_dot_contains_clusters_nodes_and_edge() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("app")).unwrap();
        fs::create_dir(temp.path().join("lib")).unwrap();
        let a = temp.path().join("app/a.proj");
        fs::write(&a, r#"<P><Import Project="../lib/b.props"/></P>"#).unwrap();
        fs::write(temp.path().join("lib/b.props"), "<P></P>").unwrap();

        let closure = closure_for(vec![a]);
        let tree = DirectoryTree::build(&closure.graph, &closure.existing);
        let opts = options();
        let dot = DiagramPrinter::new(&closure, tree.as_ref(), &opts).to_dot();

        assert!(dot.contains("digraph \"Dependencies\""));
        assert!(dot.contains("subgraph \"cluster_"));
        assert!(dot.contains("label=\"app/\""));
        assert!(dot.contains("label=\"lib/\""));
        assert!(dot.contains("label=\"a.proj\""));
        assert!(dot.contains("label=\"b.props\""));
        assert!(dot.contains("\"node0\" -> \"node1\""));
        assert!(dot.contains("tooltip=\"a.proj -> b.props\""));
    }

    #[test]
    fn test_unknown_node_dashed_red_outside_clusters() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.proj");
        fs::write(&a, r#"<P><Import Project="ghost.props"/></P>"#).unwrap();

        let closure = closure_for(vec![a]);
        let tree = DirectoryTree::build(&closure.graph, &closure.existing);
        let opts = options();
        let dot = DiagramPrinter::new(&closure, tree.as_ref(), &opts).to_dot();

        assert!(dot.contains("style=\"dashed\""));
        assert!(dot.contains("color=\"red\""));
        // edge to the unknown target also alerts
        assert!(dot.contains("tooltip=\"a.proj -> ghost.props\" color=\"red\""));
    }

    #[test]
    fn test_hide_paths_drops_cluster_prefix() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.proj");
        fs::write(&a, "<P></P>").unwrap();

        let closure = closure_for(vec![a]);
        let tree = DirectoryTree::build(&closure.graph, &closure.existing);
        let mut opts = options();
        opts.hide_paths = true;
        let dot = DiagramPrinter::new(&closure, tree.as_ref(), &opts).to_dot();

        assert!(!dot.contains("cluster_"));
        assert!(dot.contains("subgraph"));
    }

    #[test]
    fn test_ignore_deps_suppresses_edges_both_ways() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.proj");
        fs::write(&a, r#"<P><Import Project="b.props"/></P>"#).unwrap();
        fs::write(temp.path().join("b.props"), "<P></P>").unwrap();

        let closure = closure_for(vec![a]);
        let tree = DirectoryTree::build(&closure.graph, &closure.existing);

        // filter matches the edge target
        let mut opts = options();
        opts.ignore_deps = vec!["B.PROPS".into()];
        let dot = DiagramPrinter::new(&closure, tree.as_ref(), &opts).to_dot();
        assert!(!dot.contains("->"));
        // the node itself still renders inside its cluster
        assert!(dot.contains("label=\"b.props\""));

        // filter matches the edge source
        let mut opts = options();
        opts.ignore_deps = vec!["a.proj".into()];
        let dot = DiagramPrinter::new(&closure, tree.as_ref(), &opts).to_dot();
        assert!(!dot.contains("->"));
        assert!(dot.contains("label=\"a.proj\""));
    }

    #[test]
    fn test_ignore_std_suppresses_boilerplate_edges() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.proj");
        fs::write(&a, r#"<P><Import Project="Microsoft.Cpp.props"/></P>"#).unwrap();
        fs::write(temp.path().join("Microsoft.Cpp.props"), "<P></P>").unwrap();

        let closure = closure_for(vec![a]);
        let tree = DirectoryTree::build(&closure.graph, &closure.existing);
        let mut opts = options();
        opts.ignore_std = true;
        let dot = DiagramPrinter::new(&closure, tree.as_ref(), &opts).to_dot();

        assert!(!dot.contains("->"));
    }

    #[test]
    fn test_emit_writes_gv_file() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.proj");
        fs::write(&a, "<P></P>").unwrap();

        let closure = closure_for(vec![a]);
        let tree = DirectoryTree::build(&closure.graph, &closure.existing);
        let mut opts = options();
        opts.directory = temp.path().join("out");
        let written = DiagramPrinter::new(&closure, tree.as_ref(), &opts).emit().unwrap();

        assert!(written.is_file());
        let content = fs::read_to_string(written).unwrap();
        assert!(content.starts_with("// Dependencies for projects"));
    }
}
