// src/pipeline/mod.rs

//! Build pipeline: pure transformations over in-memory asset sets plus the
//! filesystem glue around them.
//!
//! - [`clean`]: delete the output tree.
//! - [`copy`]: load a source tree, write a set back out.
//! - [`fingerprint`]: rename scripts/stylesheets after their content hash.
//! - [`rewrite`]: point references at the renamed files.
//! - [`pass`]: run a task's steps in order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::model::ConfigFile;
use crate::fs::FileSystem;
use crate::serve::ServeOptions;

pub mod asset;
pub mod clean;
pub mod copy;
pub mod fingerprint;
pub mod pass;
pub mod rewrite;

pub use asset::{AssetSet, RenameMap};
pub use clean::clean_output;
pub use copy::{collect_sources, load_tree, write_assets};
pub use fingerprint::{fingerprint, FingerprintOptions};
pub use pass::{run_steps, BuildPass, PassSummary};
pub use rewrite::{rewrite_references, RewriteOptions, RewriteStats};

/// Everything a task needs to run its steps, with paths resolved against
/// the project root.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub fs: Arc<dyn FileSystem>,
    pub src: PathBuf,
    pub out: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub fingerprint: FingerprintOptions,
    pub rewrite: RewriteOptions,
    pub serve: ServeOptions,
}

impl PipelineContext {
    pub fn from_config(cfg: &ConfigFile, project_root: &Path, fs: Arc<dyn FileSystem>) -> Self {
        let out = project_root.join(&cfg.paths.out);
        Self {
            fs,
            src: project_root.join(&cfg.paths.src),
            include: cfg.paths.include.clone(),
            exclude: cfg.paths.exclude.clone(),
            fingerprint: FingerprintOptions::from(&cfg.fingerprint),
            rewrite: RewriteOptions::from(&cfg.fingerprint),
            serve: ServeOptions::new(&cfg.serve.addr, &cfg.serve.base_path, out.clone()),
            out,
        }
    }
}
