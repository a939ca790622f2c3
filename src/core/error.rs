//! Error handling for pdv.
//!
//! Per-node failures (missing project files, malformed XML) are not errors at
//! all: they are logged and contained by the collector, which degrades the
//! affected node instead of aborting. This enum covers the configuration-level
//! failures that *can* abort a run, plus the render-engine failures surfaced
//! at the very end of a run.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for pdv operations.
#[derive(Error, Debug)]
pub enum PdvError {
    /// The variable-table config file could not be read.
    #[error("failed to read config file: {path}")]
    ConfigRead {
        /// Path that was passed to `--config`.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The variable-table config file is not valid INI.
    #[error("failed to parse config file {path}: {reason}")]
    ConfigParse {
        /// Path that was passed to `--config`.
        path: PathBuf,
        /// Parser diagnostic from the INI reader.
        reason: String,
    },

    /// A solution file could not be read from disk.
    ///
    /// This loses the seeds contributed by that solution but is fatal for the
    /// run only if no seed projects remain afterwards.
    #[error("failed to read solution file: {path}")]
    SolutionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No seed projects were left after argument processing.
    #[error("no seed projects: specify at least one --proj or a readable --sln")]
    NoSeeds,

    /// The requested Graphviz layout engine is not installed.
    #[error("layout engine '{engine}' not found on PATH")]
    EngineNotFound {
        engine: String,
        #[source]
        source: which::Error,
    },

    /// The layout engine ran but exited with a failure status.
    #[error("layout engine '{engine}' failed with {status}")]
    RenderFailed { engine: String, status: ExitStatus },

    /// Generic I/O error while writing output.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
