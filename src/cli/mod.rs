//! Command-line interface for pdv.
//!
//! A single flat command: seed projects come from `--proj` and/or `--sln`,
//! dependency discovery is configured with `--dep-item`/`--dep-masks`, and
//! the remaining flags shape the Graphviz output. At least one seed argument
//! is required; everything else has defaults matching a typical
//! "show me this solution" invocation.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::PdvError;
use crate::graph::{DiagramOptions, DiagramPrinter};
use crate::msbuild::{ItemKind, ItemSpec};
use crate::resolver::DependencyCollector;
use crate::solution;
use crate::tree::DirectoryTree;
use crate::utils::paths::absolutize;
use crate::vars::VariableTable;

/// Visualize MSBuild project dependencies with Graphviz.
#[derive(Parser, Debug)]
#[command(
    name = "pdv",
    about = "Print Visual Studio project dependencies as a Graphviz diagram",
    version,
    group(ArgGroup::new("seeds").required(true).multiple(true).args(["proj", "sln"]))
)]
pub struct Cli {
    /// Seed project file; may be given multiple times.
    #[arg(long, value_name = "ProjectFilePath", help_heading = "Projects")]
    proj: Vec<PathBuf>,

    /// Solution file contributing its member projects as seeds; may be given
    /// multiple times.
    #[arg(long, value_name = "SolutionFilePath", help_heading = "Projects")]
    sln: Vec<PathBuf>,

    /// MSBuild item kind(s) to follow as dependencies.
    #[arg(
        long = "dep-item",
        value_enum,
        required = true,
        num_args = 1..,
        value_name = "Item",
        help_heading = "Projects"
    )]
    dep_item: Vec<ItemKind>,

    /// Dependency file-extension masks, e.g. ".targets" ".props".
    /// Without masks every reference value counts.
    #[arg(long = "dep-masks", num_args = 0.., value_name = ".file_extension", help_heading = "Projects")]
    dep_masks: Vec<String>,

    /// Do not print dependencies to/from projects matching this file-name
    /// suffix; may be given multiple times.
    #[arg(long = "ignore-deps", value_name = "ProjectFileName", help_heading = "Projects")]
    ignore_deps: Vec<String>,

    /// INI config with a [DEFAULT] section of variable definitions used to
    /// resolve tokens like $(SolutionDir) in project paths.
    #[arg(long, value_name = "ConfigFilePath", help_heading = "Projects")]
    config: Option<PathBuf>,

    /// Ignore standard imports like "$(VCTargetsPath)\Microsoft.Cpp.Default.props".
    #[arg(long = "ignore-std-proj", help_heading = "Projects")]
    ignore_std: bool,

    /// Graph name used in the DOT source.
    #[arg(long, default_value = "Dependencies", help_heading = "Graphviz")]
    name: String,

    /// Comment added to the first line of the source.
    #[arg(long, default_value = "Dependencies for projects", help_heading = "Graphviz")]
    comment: String,

    /// Label of the graph in the image.
    #[arg(long, default_value = "Dependencies", help_heading = "Graphviz")]
    label: String,

    /// Filename for saving the DOT source.
    #[arg(long, default_value = "project_dependencies.gv", help_heading = "Graphviz")]
    outfilename: String,

    /// (Sub)directory for source saving and rendering.
    #[arg(long, default_value = ".out", help_heading = "Graphviz")]
    outdir: PathBuf,

    /// Rendering output format ('svg', 'pdf', 'png', ...).
    #[arg(long, default_value = "svg", help_heading = "Graphviz")]
    outformat: String,

    /// Layout engine to use ('dot', 'neato', ...).
    #[arg(long, default_value = "dot", help_heading = "Graphviz")]
    engine: String,

    /// Render the saved source to an image with the layout engine.
    #[arg(long = "with-render", help_heading = "Graphviz")]
    render: bool,

    /// Do not draw directory boxes around project nodes.
    #[arg(long = "without-paths", help_heading = "Graphviz")]
    hide_paths: bool,

    /// Enable debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Initializes the tracing subscriber from the verbosity flags, letting
    /// an explicit `RUST_LOG` win over the defaults.
    pub fn init_logging(&self) {
        let filter = if self.quiet {
            EnvFilter::new("error")
        } else if self.verbose {
            EnvFilter::new("debug")
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new("info")
        };

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
    }

    /// Runs the whole pipeline: seeds, closure, tree, diagram.
    pub fn execute(self) -> Result<()> {
        let vars = match &self.config {
            Some(path) => VariableTable::from_ini_file(path)?,
            None => VariableTable::default(),
        };

        let specs: Vec<ItemSpec> =
            self.dep_item.iter().map(|&kind| ItemSpec::new(kind, &self.dep_masks)).collect();

        let seeds = self.gather_seeds()?;

        info!("collecting project dependencies...");
        let collector = DependencyCollector::new(&specs, &vars);
        let closure = collector.collect(seeds);

        let tree = DirectoryTree::build(&closure.graph, &closure.existing);

        info!("printing projects...");
        let options = DiagramOptions {
            name: self.name,
            comment: self.comment,
            label: self.label,
            filename: self.outfilename,
            directory: self.outdir,
            format: self.outformat,
            engine: self.engine,
            render: self.render,
            hide_paths: self.hide_paths,
            ignore_std: self.ignore_std,
            ignore_deps: self.ignore_deps,
        };
        let printer = DiagramPrinter::new(&closure, tree.as_ref(), &options);
        printer.emit()?;
        info!("projects printed");

        Ok(())
    }

    /// Collects seed paths from `--proj` and `--sln` arguments.
    ///
    /// An unreadable solution loses only its own seeds; the run aborts only
    /// when nothing is left to process at all.
    fn gather_seeds(&self) -> Result<Vec<PathBuf>> {
        let mut seeds = Vec::new();

        for proj in &self.proj {
            seeds.push(absolutize(proj)?);
        }

        for sln in &self.sln {
            match solution::parse_solution(sln) {
                Ok(projects) => seeds.extend(projects),
                Err(e) => error!("skipping solution: {e}"),
            }
        }

        if seeds.is_empty() {
            return Err(PdvError::NoSeeds.into());
        }
        Ok(seeds)
    }
}
