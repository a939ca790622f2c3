//! Path normalization and case-insensitive path comparison.
//!
//! Project identity in pdv is a normalized absolute path compared without
//! regard to case, because the file systems in scope (NTFS and friends) are
//! case-insensitive. All comparisons in this module are purely lexical: no
//! function here touches the file system.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components lexically.
///
/// Unlike `std::fs::canonicalize`, this works on paths that don't exist and
/// never follows symlinks, which matters here because unresolved dependency
/// references frequently point at files that are not on disk.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Makes a path absolute against the current working directory, normalized.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    Ok(normalize_path(&std::env::current_dir()?.join(path)))
}

/// Returns the case-folded identity key for a path.
///
/// Two paths with the same key refer to the same project for the lifetime of
/// a run. The key is only used for map lookups; the originally observed
/// spelling is kept for display.
#[must_use]
pub fn identity_key(path: &Path) -> String {
    normalize_path(path).to_string_lossy().to_lowercase()
}

/// Case-insensitive path equality on normalized components.
#[must_use]
pub fn path_eq_ci(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize_path(a), normalize_path(b));
    let mut ac = a.components();
    let mut bc = b.components();
    loop {
        match (ac.next(), bc.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if !component_eq_ci(x, y) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Returns true if `ancestor` is a strict ancestor directory of `path`.
#[must_use]
pub fn is_ancestor_of(ancestor: &Path, path: &Path) -> bool {
    let ancestor = normalize_path(ancestor);
    let path = normalize_path(path);
    let anc: Vec<_> = ancestor.components().collect();
    let des: Vec<_> = path.components().collect();
    if anc.len() >= des.len() {
        return false;
    }
    anc.iter().zip(des.iter()).all(|(a, b)| component_eq_ci(*a, *b))
}

/// Computes the deepest common ancestor of two paths.
///
/// The casing of the first argument wins in the result. For paths with no
/// common prefix this returns an empty path; project paths are all absolute
/// here, so in practice at least the root is shared.
#[must_use]
pub fn common_ancestor(a: &Path, b: &Path) -> PathBuf {
    let a = normalize_path(a);
    let b = normalize_path(b);
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| component_eq_ci(*x, *y))
        .map(|(x, _)| x)
        .collect()
}

fn component_eq_ci(a: Component<'_>, b: Component<'_>) -> bool {
    a.as_os_str().to_string_lossy().to_lowercase() == b.as_os_str().to_string_lossy().to_lowercase()
}
