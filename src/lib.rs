//! pdv - MSBuild project dependency visualizer.
//!
//! Discovers the transitive dependency closure among MSBuild build-description
//! files (`*.vcxproj`, `*.csproj`, `*.props`, `*.targets`, and `.sln`
//! aggregators) and emits a Graphviz diagram grouping the discovered projects
//! by directory.
//!
//! # Pipeline
//!
//! Seed paths (from `--proj` and `--sln`) feed the [`resolver`], which owns
//! the identity registry and runs the worklist closure with lazily discovered
//! edges. The resulting partition into existing and unknown projects feeds
//! the [`tree`] builder (existing projects only), and the [`graph`] module
//! assembles the DOT output and optionally invokes the layout engine.
//!
//! # Modules
//!
//! - [`cli`] - clap argument surface and run orchestration
//! - [`core`] - shared error type
//! - [`msbuild`] - project-file model and XML inspection
//! - [`resolver`] - identity registry and dependency closure
//! - [`solution`] - `.sln` aggregator parsing with encoding fallback
//! - [`tree`] - minimal directory-grouping tree
//! - [`graph`] - DOT construction and diagram assembly
//! - [`vars`] - `$(Name)` placeholder resolution
//! - [`utils`] - path normalization and case-insensitive comparison

pub mod cli;
pub mod core;
pub mod graph;
pub mod msbuild;
pub mod resolver;
pub mod solution;
pub mod tree;
pub mod utils;
pub mod vars;
