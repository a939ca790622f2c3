//! Visual Studio solution parsing.
//!
//! Solutions are line-oriented text files listing member projects between
//! `Project(` and `EndProject` markers. They come in several encodings in the
//! wild (UTF-8 with or without BOM, UTF-16 of either endianness, legacy
//! Windows-1252), so the bytes are read once and decoded through a fallback
//! chain before the project paths are extracted.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_16LE, WINDOWS_1252};
use regex::Regex;
use tracing::debug;

use crate::core::PdvError;
use crate::utils::paths::normalize_path;

/// One `Project( ... EndProject` block, markers included.
static PROJECT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bProject\(.+?\bEndProject\b").expect("project block pattern is valid")
});

/// Decodes solution bytes with the fallback chain.
///
/// Whatever a BOM announces (UTF-8/UTF-16LE/BE) wins; otherwise NUL bytes
/// mark BOM-less UTF-16LE, then strict UTF-8 is tried, then Windows-1252,
/// which maps every byte and so always yields text. The chain therefore
/// cannot fail; only the initial read can.
///
/// The NUL check runs before the UTF-8 attempt on purpose: UTF-16LE-encoded
/// ASCII is byte-for-byte valid UTF-8, and decoding it as such yields
/// NUL-interleaved text no project marker can match.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!("solution decoded as {} via BOM", encoding.name());
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Cow::Owned(text.into_owned());
    }

    // Solution text never contains NULs in any byte-oriented encoding, so
    // their presence marks a UTF-16 file saved without a BOM (little-endian
    // on Windows).
    if bytes.contains(&0) {
        debug!("solution decoded as utf-16le without BOM");
        let (text, _) = UTF_16LE.decode_without_bom_handling(bytes);
        return Cow::Owned(text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        debug!("solution decoded as utf-8");
        return Cow::Borrowed(text);
    }

    debug!("solution decoded as windows-1252 fallback");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    Cow::Owned(text.into_owned())
}

/// Extracts seed project paths from a solution file.
///
/// Paths are the quoted second field of each project line. Only values ending
/// in `proj` are kept (solution folders and similar entries are dropped);
/// relative ones are joined to the solution's directory and normalized.
pub fn parse_solution(sln_path: &Path) -> Result<Vec<PathBuf>, PdvError> {
    let sln_path = crate::utils::paths::absolutize(sln_path)
        .map_err(|source| PdvError::SolutionRead { path: sln_path.to_path_buf(), source })?;
    let bytes = std::fs::read(&sln_path)
        .map_err(|source| PdvError::SolutionRead { path: sln_path.clone(), source })?;
    let content = decode(&bytes);

    let sln_dir = sln_path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut projects = Vec::new();

    for block in PROJECT_BLOCK.find_iter(&content) {
        let Some(field) = block.as_str().split(',').nth(1) else {
            continue;
        };
        let raw = field.trim().trim_matches('"').trim();
        if !raw.ends_with("proj") {
            continue;
        }

        let path = Path::new(raw);
        let path = if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&sln_dir.join(path))
        };
        debug!("solution project: {}", path.display());
        projects.push(path);
    }

    Ok(projects)
}
