//! Dependency closure computation.
//!
//! The registry ([`ProjectGraph`]) guarantees one node per identity for the
//! lifetime of a run; the collector drives the worklist loop that discovers
//! edges lazily by inspecting each node's XML. Selection order off the
//! worklist is unspecified and nothing may depend on it; determinism comes
//! from the final sort and sequence-number assignment in [`Closure`].

mod collector;
mod project_graph;

pub use collector::{Closure, DependencyCollector, resolve_reference};
pub use project_graph::{ProjectGraph, ProjectNode};
