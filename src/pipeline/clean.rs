// src/pipeline/clean.rs

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::fs::FileSystem;

/// Recursively delete the output tree. A missing directory is not an error.
pub fn clean_output(fs: &dyn FileSystem, out: &Path) -> Result<()> {
    if !fs.exists(out) {
        debug!(out = ?out, "output directory absent; nothing to clean");
        return Ok(());
    }

    if fs.is_dir(out) {
        fs.remove_dir_all(out)?;
    } else {
        fs.remove_file(out)?;
    }

    info!(out = ?out, "cleaned output directory");
    Ok(())
}
