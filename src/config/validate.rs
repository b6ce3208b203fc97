// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::preset::preset_tasks;
use crate::errors::{AssetdagError, Result};
use crate::pipeline::fingerprint::MAX_TOKEN_LENGTH;
use crate::types::Step;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetdagError;

    fn try_from(mut raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        if raw.task.is_empty() {
            raw.task = preset_tasks(raw.config.preset, &raw.paths);
        }
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_task_steps(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(AssetdagError::ConfigError(
            "[config].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }

    let len = cfg.fingerprint.token_length;
    if len == 0 || len > MAX_TOKEN_LENGTH {
        return Err(AssetdagError::ConfigError(format!(
            "[fingerprint].token_length must be between 1 and {MAX_TOKEN_LENGTH} (got {len})"
        )));
    }

    if !cfg.serve.base_path.starts_with('/') {
        return Err(AssetdagError::ConfigError(format!(
            "[serve].base_path must start with '/' (got '{}')",
            cfg.serve.base_path
        )));
    }

    if cfg.paths.src.is_absolute() {
        return Err(AssetdagError::ConfigError(format!(
            "[paths].src must be relative to the project root (got '{}')",
            cfg.paths.src.display()
        )));
    }

    if cfg.paths.include.is_empty() {
        return Err(AssetdagError::ConfigError(
            "[paths].include must contain at least one glob".to_string(),
        ));
    }

    Ok(())
}

fn validate_task_steps(cfg: &RawConfigFile) -> Result<()> {
    let mut serving_task: Option<&str> = None;

    for (name, task) in cfg.task.iter() {
        let serve_positions: Vec<usize> = task
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Step::Serve)
            .map(|(i, _)| i)
            .collect();

        if serve_positions.is_empty() {
            continue;
        }

        if serve_positions.len() > 1 || serve_positions[0] != task.steps.len() - 1 {
            return Err(AssetdagError::ConfigError(format!(
                "task '{name}': `serve` may appear once and must be the last step"
            )));
        }

        if let Some(other) = serving_task {
            return Err(AssetdagError::ConfigError(format!(
                "tasks '{other}' and '{name}' both serve; only one task may contain `serve`"
            )));
        }
        serving_task = Some(name.as_str());
    }

    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if dep == name {
                return Err(AssetdagError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !cfg.task.contains_key(dep) {
                return Err(AssetdagError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction is dep -> task: `[task.build] after = ["clean"]` adds
    // clean -> build.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(AssetdagError::DagCycle(format!(
            "cycle detected in task DAG involving task '{}'",
            cycle.node_id()
        ))),
    }
}
