//! MSBuild project-file model.
//!
//! An MSBuild "project" here is any XML build-description file: `*.vcxproj`,
//! `*.csproj`, `*.props` or `*.targets`. Dependencies are declared as
//! attribute values on well-known elements; which elements to follow is
//! selected per run with `--dep-item`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use roxmltree::Document;
use tracing::{error, warn};

/// The closed set of MSBuild item kinds pdv knows how to follow.
///
/// Each kind names the XML element carrying dependency references and knows
/// which attribute holds the referenced path. Kinds outside this set are
/// rejected at argument-parsing time, not at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ItemKind {
    /// `<ProjectReference Include="..."/>` in csproj/vcxproj files.
    #[value(name = "ProjectReference")]
    ProjectReference,
    /// Variant spelling emitted by some generators.
    #[value(name = "ProjectReference2")]
    ProjectReference2,
    /// `<Import Project="..."/>` for props/targets chains.
    #[value(name = "Import")]
    Import,
}

impl ItemKind {
    /// The XML element name this kind matches.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::ProjectReference => "ProjectReference",
            Self::ProjectReference2 => "ProjectReference2",
            Self::Import => "Import",
        }
    }

    /// The attribute holding the dependency reference.
    #[must_use]
    pub fn attribute(self) -> &'static str {
        match self {
            Self::ProjectReference | Self::ProjectReference2 => "Include",
            Self::Import => "Project",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One dependency-discovery rule: an item kind plus optional suffix masks.
///
/// Masks restrict which attribute values count as dependencies; a value
/// matches when it ends (case-insensitively) with any mask. No masks means
/// every value counts.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    kind: ItemKind,
    masks: Vec<String>,
}

impl ItemSpec {
    /// Creates a spec; masks are folded to lowercase once, up front.
    pub fn new<S: AsRef<str>>(kind: ItemKind, masks: &[S]) -> Self {
        Self { kind, masks: masks.iter().map(|m| m.as_ref().to_lowercase()).collect() }
    }

    /// Collects matching attribute values from a parsed document.
    ///
    /// Note: a reference may carry a `Condition` attribute gating it to a
    /// particular configuration; conditions are not evaluated, the reference
    /// is always collected.
    pub fn matching_values(&self, doc: &Document<'_>) -> Vec<String> {
        let mut values = Vec::new();
        for node in doc.descendants().filter(|n| n.has_tag_name(self.kind.tag())) {
            let Some(value) = node.attribute(self.kind.attribute()) else {
                continue;
            };
            if self.matches_mask(value) {
                values.push(value.to_string());
            }
        }
        values
    }

    fn matches_mask(&self, value: &str) -> bool {
        if self.masks.is_empty() {
            return true;
        }
        let value = value.to_lowercase();
        self.masks.iter().any(|mask| value.ends_with(mask))
    }
}

/// Reads and parses a project file, logging instead of failing.
///
/// Returns `None` both for unreadable files and for malformed XML: a project
/// that cannot be inspected simply has no discoverable dependencies.
pub fn read_project_xml(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("failed to read project [{}]: {e}", path.display());
            None
        }
    }
}

/// Parses project XML, containing the failure at the node level.
pub fn parse_project_xml<'a>(path: &Path, content: &'a str) -> Option<Document<'a>> {
    match Document::parse(content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            error!("failed to parse project [{}]: {e}", path.display());
            None
        }
    }
}

/// Extracts the declared output types of a project, for diagram coloring.
///
/// `*.vcxproj` files declare theirs as `ConfigurationType` element text,
/// `*.csproj` files as `OutputType`. Returns `None` when the file cannot be
/// inspected or declares nothing.
pub fn output_types(path: &Path) -> Option<BTreeSet<String>> {
    let content = read_project_xml(path)?;
    let doc = parse_project_xml(path, &content)?;

    let mut types = BTreeSet::new();
    for node in doc.descendants() {
        if node.has_tag_name("ConfigurationType") || node.has_tag_name("OutputType") {
            if let Some(text) = node.text() {
                let text = text.trim();
                if !text.is_empty() {
                    types.insert(text.to_string());
                }
            }
        }
    }

    if types.is_empty() { None } else { Some(types) }
}

/// Standard framework imports that `--ignore-std-proj` suppresses.
const STANDARD_PROJECTS: &[&str] = &[
    "Microsoft.Cpp.props",
    "Microsoft.Cpp.Default.props",
    "Microsoft.Cpp.$(Platform).user.props",
    "Microsoft.Cpp.targets",
];

/// True if the file name is one of the known MSBuild boilerplate imports.
#[must_use]
pub fn is_standard_project(file_name: &str) -> bool {
    let file_name = file_name.to_lowercase();
    STANDARD_PROJECTS.iter().any(|std| file_name.ends_with(&std.to_lowercase()))
}
