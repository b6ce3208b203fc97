// src/pipeline/pass.rs

//! Running a task's build steps in order against one shared pass state.

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::pipeline::asset::{AssetSet, RenameMap};
use crate::pipeline::clean::clean_output;
use crate::pipeline::copy::{collect_sources, load_tree, write_assets};
use crate::pipeline::fingerprint::fingerprint;
use crate::pipeline::rewrite::{rewrite_references, RewriteStats};
use crate::pipeline::PipelineContext;
use crate::types::Step;

/// What a finished pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub steps: Vec<Step>,
    pub files_written: usize,
    pub renamed: usize,
    pub rewrite: RewriteStats,
}

/// Mutable state of one task execution.
///
/// `copy` loads the source tree; `fingerprint` and `rewrite` work on the
/// loaded set, or on the current output tree when nothing was loaded yet.
/// [`BuildPass::finish`] flushes the set to the output tree.
#[derive(Debug)]
pub struct BuildPass<'a> {
    ctx: &'a PipelineContext,
    assets: Option<AssetSet>,
    renames: RenameMap,
    summary: PassSummary,
}

impl<'a> BuildPass<'a> {
    pub fn new(ctx: &'a PipelineContext) -> Self {
        Self {
            ctx,
            assets: None,
            renames: RenameMap::new(),
            summary: PassSummary::default(),
        }
    }

    pub fn renames(&self) -> &RenameMap {
        &self.renames
    }

    pub fn apply(&mut self, step: Step) -> Result<()> {
        debug!(%step, "applying build step");
        let fs = self.ctx.fs.as_ref();

        match step {
            Step::Clean => clean_output(fs, &self.ctx.out)?,
            Step::Copy => {
                let set = collect_sources(fs, &self.ctx.src, &self.ctx.include, &self.ctx.exclude)?;
                self.assets = Some(set);
                self.renames = RenameMap::new();
            }
            Step::Fingerprint => {
                let set = self.take_or_load_output()?;
                let (set, renames) = fingerprint(set, &self.ctx.fingerprint);
                self.summary.renamed += renames.len();
                self.renames.extend(renames);
                self.assets = Some(set);
            }
            Step::Rewrite => {
                let set = self.take_or_load_output()?;
                let (set, stats) = rewrite_references(set, &self.renames, &self.ctx.rewrite);
                self.summary.rewrite.files_scanned += stats.files_scanned;
                self.summary.rewrite.files_changed += stats.files_changed;
                self.summary.rewrite.replacements += stats.replacements;
                self.assets = Some(set);
            }
            Step::Serve => bail!("`serve` is not a build step and cannot run inside a build pass"),
        }

        self.summary.steps.push(step);
        Ok(())
    }

    /// Flush the loaded set, dropping stale originals of renamed files.
    pub fn finish(mut self) -> Result<PassSummary> {
        let Some(assets) = self.assets.take() else {
            return Ok(self.summary);
        };
        let fs = self.ctx.fs.as_ref();

        for (original, _) in self.renames.iter() {
            let stale = self.ctx.out.join(original);
            if fs.is_file(&stale) {
                fs.remove_file(&stale)?;
            }
        }

        write_assets(fs, &self.ctx.out, &assets)?;
        self.summary.files_written = assets.len();
        Ok(self.summary)
    }

    fn take_or_load_output(&mut self) -> Result<AssetSet> {
        match self.assets.take() {
            Some(set) => Ok(set),
            None => load_tree(self.ctx.fs.as_ref(), &self.ctx.out),
        }
    }
}

/// Run `steps` in order and flush the result.
pub fn run_steps(ctx: &PipelineContext, steps: &[Step]) -> Result<PassSummary> {
    let mut pass = BuildPass::new(ctx);
    for step in steps {
        pass.apply(*step)?;
    }
    let summary = pass.finish()?;

    info!(
        steps = ?summary.steps,
        files = summary.files_written,
        renamed = summary.renamed,
        references = summary.rewrite.replacements,
        "build pass finished"
    );
    Ok(summary)
}
