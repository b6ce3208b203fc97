// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{ConfigFile, TaskConfig};
use crate::engine::TaskName;

/// Watch/exclude lists from `[default]`.
#[derive(Debug, Clone, Default)]
pub struct WatchDefaults {
    pub watch: Vec<String>,
    pub exclude: Vec<String>,
}

impl WatchDefaults {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let section = cfg.default_section();
        Self {
            watch: section.watch.clone(),
            exclude: section.exclude.clone(),
        }
    }
}

/// Per-task pattern lists as declared, before defaults are merged in.
#[derive(Debug, Clone)]
pub struct RawTaskPatternSpec {
    pub name: TaskName,
    pub watch: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub append_default_watch: bool,
    pub append_default_exclude: bool,
    /// Direct dependencies (`after = [...]`), for DAG-aware triggering.
    pub deps: Vec<TaskName>,
}

impl RawTaskPatternSpec {
    pub fn from_task(name: &str, task: &TaskConfig) -> Self {
        Self {
            name: name.to_string(),
            watch: task.watch.clone(),
            exclude: task.exclude.clone(),
            append_default_watch: task.append_default_watch,
            append_default_exclude: task.append_default_exclude,
            deps: task.after.clone(),
        }
    }
}

/// Compiled globs for one task, matched against project-relative paths
/// such as `"src/js/app.js"`.
#[derive(Clone)]
pub struct TaskWatchProfile {
    name: TaskName,
    deps: Vec<TaskName>,
    watch: GlobSet,
    exclude: GlobSet,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("watch_globs", &self.watch.len())
            .field("exclude_globs", &self.exclude.len())
            .finish()
    }
}

impl TaskWatchProfile {
    fn compile(defaults: &WatchDefaults, raw: &RawTaskPatternSpec) -> Result<Self> {
        let watch = merged(raw.watch.as_deref(), &defaults.watch, raw.append_default_watch);
        let exclude = merged(
            raw.exclude.as_deref(),
            &defaults.exclude,
            raw.append_default_exclude,
        );

        Ok(Self {
            name: raw.name.clone(),
            deps: raw.deps.clone(),
            watch: build_globset(&watch)
                .with_context(|| format!("task `{}`: watch patterns", raw.name))?,
            exclude: build_globset(&exclude)
                .with_context(|| format!("task `{}`: exclude patterns", raw.name))?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deps(&self) -> &[TaskName] {
        &self.deps
    }

    /// True when `rel_path` hits a watch glob and no exclude glob. A task
    /// with no watch patterns never matches.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch.is_match(rel_path) && !self.exclude.is_match(rel_path)
    }
}

/// A task's own list, the default list, or both when `append` is set.
fn merged(own: Option<&[String]>, default: &[String], append: bool) -> Vec<String> {
    let mut out = own.map(<[String]>::to_vec).unwrap_or_else(|| default.to_vec());
    if append && own.is_some() {
        out.extend_from_slice(default);
    }
    out
}

/// Compile one profile per task.
pub fn build_task_watch_profiles(
    defaults: &WatchDefaults,
    specs: &[RawTaskPatternSpec],
) -> Result<Vec<TaskWatchProfile>> {
    specs
        .iter()
        .map(|raw| TaskWatchProfile::compile(defaults, raw))
        .collect()
}

/// Compile a `GlobSet` from string patterns. Shared with the copier's
/// include/exclude selection.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    patterns
        .iter()
        .try_fold(GlobSetBuilder::new(), |mut builder, pattern| {
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
            builder.add(glob);
            Ok::<_, anyhow::Error>(builder)
        })?
        .build()
        .context("compiling glob set")
}

/// Defaults plus one compiled profile per configured task.
pub fn build_profiles_from_config(
    cfg: &ConfigFile,
) -> Result<(WatchDefaults, Vec<TaskWatchProfile>)> {
    let defaults = WatchDefaults::from_config(cfg);
    let specs: Vec<RawTaskPatternSpec> = cfg
        .tasks()
        .iter()
        .map(|(name, task)| RawTaskPatternSpec::from_task(name, task))
        .collect();

    let profiles = build_task_watch_profiles(&defaults, &specs)?;
    Ok((defaults, profiles))
}
