// src/pipeline/copy.rs

//! Loading a source tree into an [`AssetSet`] and flushing a set to disk.

use std::path::Path;

use anyhow::{Context, Result};
use globset::GlobSet;
use tracing::{debug, info, warn};

use crate::fs::{relative_slash_path, walk_files, FileSystem};
use crate::pipeline::asset::AssetSet;
use crate::watch::patterns::build_globset;

/// Read every file below `src_root` whose relative path matches `include`
/// and none of `exclude`.
///
/// A missing source root yields an empty set.
pub fn collect_sources(
    fs: &dyn FileSystem,
    src_root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<AssetSet> {
    if !fs.is_dir(src_root) {
        warn!(src = ?src_root, "source directory does not exist; nothing to copy");
        return Ok(AssetSet::new());
    }

    let include_set = build_globset(include).context("building include globset")?;
    let exclude_set = if exclude.is_empty() {
        None
    } else {
        Some(build_globset(exclude).context("building exclude globset")?)
    };

    let mut assets = AssetSet::new();
    for path in walk_files(fs, src_root)? {
        let Some(rel) = relative_slash_path(src_root, &path) else {
            continue;
        };
        if !selected(&rel, &include_set, exclude_set.as_ref()) {
            debug!(file = %rel, "not selected for copy");
            continue;
        }
        let contents = fs.read(&path)?;
        assets.insert(rel, contents);
    }

    debug!(src = ?src_root, files = assets.len(), "collected sources");
    Ok(assets)
}

/// Load everything below `root` without filtering (used when a task
/// post-processes an existing output tree).
pub fn load_tree(fs: &dyn FileSystem, root: &Path) -> Result<AssetSet> {
    if !fs.is_dir(root) {
        return Ok(AssetSet::new());
    }

    let mut assets = AssetSet::new();
    for path in walk_files(fs, root)? {
        if let Some(rel) = relative_slash_path(root, &path) {
            let contents = fs.read(&path)?;
            assets.insert(rel, contents);
        }
    }
    Ok(assets)
}

/// Write every asset below `out_root`. Not transactional: an error leaves
/// whatever was already written in place.
pub fn write_assets(fs: &dyn FileSystem, out_root: &Path, assets: &AssetSet) -> Result<()> {
    for (rel, contents) in assets.iter() {
        fs.write(&out_root.join(rel), contents)?;
    }
    info!(out = ?out_root, files = assets.len(), "wrote assets");
    Ok(())
}

fn selected(rel: &str, include: &GlobSet, exclude: Option<&GlobSet>) -> bool {
    include.is_match(rel) && !exclude.is_some_and(|ex| ex.is_match(rel))
}
