// src/watch/path_utils.rs

use std::path::Path;

use crate::fs::relative_slash_path;

/// `path` relative to `root` with forward slashes.
///
/// Falls back to comparing canonicalized paths, since notify may report a
/// different absolute prefix for the same directory (symlinks, macOS
/// `/private/var`). `None` if the path lies outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Some(rel) = relative_slash_path(root, path) {
        return Some(rel);
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path
        .canonicalize()
        .ok()
        .or_else(|| canonical_parent_join(path))?;
    relative_slash_path(&root_canon, &path_canon)
}

/// Deleted files cannot be canonicalized; resolve their parent instead.
fn canonical_parent_join(path: &Path) -> Option<std::path::PathBuf> {
    let parent = path.parent()?.canonicalize().ok()?;
    Some(parent.join(path.file_name()?))
}
