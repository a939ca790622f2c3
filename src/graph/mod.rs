//! Graphviz output: DOT construction and diagram assembly.

pub mod diagram;
pub mod dot;

pub use diagram::{DiagramOptions, DiagramPrinter, output_type_color};
pub use dot::DotBuilder;
