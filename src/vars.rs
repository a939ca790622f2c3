//! Placeholder-variable resolution for project paths.
//!
//! MSBuild project references routinely embed symbolic tokens like
//! `$(SolutionDir)` or `$(VCTargetsPath)`. pdv has no variable-scoping model;
//! instead a flat token→value table is loaded once from an INI file
//! (`[DEFAULT]` section, case-sensitive keys) and threaded read-only through
//! the whole run.
//!
//! Resolution is a single pass: each token found in the input that has a
//! non-empty table entry is replaced literally, left to right. Values are
//! never re-scanned, so a value that itself contains a placeholder stays as
//! written. Nested placeholders are out of scope.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use ini::Ini;
use regex::Regex;
use tracing::debug;

use crate::core::PdvError;

/// Matches one `$(Name)` token, shortest form.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(.+?\)").expect("placeholder pattern is valid"));

/// Flat table of placeholder tokens to replacement strings.
///
/// Keys are stored as full token text including the `$(...)` wrapper, exactly
/// as they appear in the config file and in project references.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    entries: HashMap<String, String>,
}

impl VariableTable {
    /// Loads the table from the `[DEFAULT]` section of an INI file.
    ///
    /// Keys are case-sensitive. An empty or absent `[DEFAULT]` section yields
    /// an empty table, which leaves every placeholder unresolved.
    pub fn from_ini_file(path: &Path) -> Result<Self, PdvError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => PdvError::ConfigRead { path: path.to_path_buf(), source },
            ini::Error::Parse(parse) => {
                PdvError::ConfigParse { path: path.to_path_buf(), reason: parse.to_string() }
            }
        })?;

        let mut entries = HashMap::new();
        if let Some(section) = ini.section(Some("DEFAULT")) {
            for (key, value) in section.iter() {
                entries.insert(key.to_string(), value.to_string());
            }
        }
        debug!(count = entries.len(), "loaded variable table");
        Ok(Self { entries })
    }

    /// Builds a table directly from token/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Replaces every known placeholder token in `text`.
    ///
    /// Tokens missing from the table, or mapped to an empty value, are left
    /// verbatim. Duplicate tokens are each replaced; the result for
    /// `$(X)$(X)` with `X=v` is `vv`.
    #[must_use]
    pub fn resolve(&self, text: &str) -> String {
        let mut result = text.to_string();
        for token in PLACEHOLDER.find_iter(text) {
            if let Some(value) = self.entries.get(token.as_str())
                && !value.is_empty()
            {
                result = result.replace(token.as_str(), value);
            }
        }
        result
    }

    /// True if the table carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
