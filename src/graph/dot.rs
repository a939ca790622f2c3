//! DOT source construction.
//!
//! A small string builder for Graphviz output: graph/node/edge defaults,
//! arbitrarily nested subgraphs for directory clusters, and attribute-carrying
//! nodes and edges. Output is deterministic given the call sequence.

use std::fmt::Write;

/// Escape special characters for DOT string values.
#[must_use]
pub fn escape(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Turns a directory path into a DOT-safe subgraph identifier.
///
/// Path separators, drive colons and dots all become underscores. The
/// `cluster` flag controls the `cluster_` prefix Graphviz uses to decide
/// whether the subgraph is drawn as a box.
#[must_use]
pub fn subgraph_id(path: &str, cluster: bool) -> String {
    let prefix = if cluster { "cluster_" } else { "" };
    let sanitized: String = path
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '.') { '_' } else { c })
        .collect();
    format!("{prefix}{sanitized}")
}

/// Incremental DOT source builder.
pub struct DotBuilder {
    out: String,
    indent: usize,
}

impl DotBuilder {
    /// Opens a `digraph`, with an optional `//` comment on the first line.
    #[must_use]
    pub fn new(name: &str, comment: &str) -> Self {
        let mut out = String::with_capacity(4096);
        if !comment.is_empty() {
            let _ = writeln!(out, "// {comment}");
        }
        let _ = writeln!(out, "digraph \"{}\" {{", escape(name));
        Self { out, indent: 1 }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn attr_list(out: &mut String, attrs: &[(&str, &str)]) {
        for (i, (key, value)) in attrs.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{key}=\"{}\"", escape(value));
        }
    }

    /// Sets attributes on the current (sub)graph.
    pub fn graph_attrs(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        self.out.push_str("graph [");
        Self::attr_list(&mut self.out, attrs);
        self.out.push_str("]\n");
        self
    }

    /// Sets default node attributes at the current level.
    pub fn node_defaults(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        self.out.push_str("node [");
        Self::attr_list(&mut self.out, attrs);
        self.out.push_str("]\n");
        self
    }

    /// Sets default edge attributes at the current level.
    pub fn edge_defaults(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        self.out.push_str("edge [");
        Self::attr_list(&mut self.out, attrs);
        self.out.push_str("]\n");
        self
    }

    /// Opens a subgraph; close it with [`Self::end_subgraph`].
    pub fn begin_subgraph(&mut self, id: &str, label: &str) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.out, "subgraph \"{}\" {{", escape(id));
        self.indent += 1;
        self.write_indent();
        let _ = writeln!(self.out, "label=\"{}\"", escape(label));
        self
    }

    pub fn end_subgraph(&mut self) -> &mut Self {
        self.indent -= 1;
        self.write_indent();
        self.out.push_str("}\n");
        self
    }

    /// Emits one node with attributes.
    pub fn node(&mut self, id: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        let _ = write!(self.out, "\"{}\" [", escape(id));
        Self::attr_list(&mut self.out, attrs);
        self.out.push_str("]\n");
        self
    }

    /// Emits one edge with attributes.
    pub fn edge(&mut self, from: &str, to: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        let _ = write!(self.out, "\"{}\" -> \"{}\"", escape(from), escape(to));
        if !attrs.is_empty() {
            self.out.push_str(" [");
            Self::attr_list(&mut self.out, attrs);
            self.out.push(']');
        }
        self.out.push('\n');
        self
    }

    /// Closes the digraph and returns the source.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r"C:\dir"), r"C:\\dir");
        assert_eq!(escape("a\"b"), "a\\\"b");
    }

    #[test]
    fn test_subgraph_id() {
        assert_eq!(subgraph_id("/r/a.b", true), "cluster__r_a_b");
        assert_eq!(subgraph_id("C:\\r", false), "C__r");
    }

    #[test]
    fn test_builder_shape() {
        let mut builder = DotBuilder::new("Dependencies", "made by pdv");
        builder
            .graph_attrs(&[("rankdir", "LR")])
            .node_defaults(&[("shape", "box")])
            .begin_subgraph("cluster_r", "/r/")
            .node("node0", &[("label", "a.proj")])
            .end_subgraph()
            .edge("node0", "node1", &[("color", "brown")]);
        let dot = builder.finish();

        assert!(dot.starts_with("// made by pdv\ndigraph \"Dependencies\" {\n"));
        assert!(dot.contains("graph [rankdir=\"LR\"]"));
        assert!(dot.contains("subgraph \"cluster_r\" {"));
        assert!(dot.contains("\"node0\" [label=\"a.proj\"]"));
        assert!(dot.contains("\"node0\" -> \"node1\" [color=\"brown\"]"));
        assert!(dot.ends_with("}\n"));
    }
}
