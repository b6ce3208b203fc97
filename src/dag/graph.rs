// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::config::model::ConfigFile;
use crate::errors::{AssetdagError, Result};

/// Immediate deps and dependents of one task.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Tasks that must finish before this one can run.
    deps: Vec<String>,
    /// Tasks that list this one in their `after`.
    dependents: Vec<String>,
}

/// In-memory DAG keyed by task name.
///
/// Acyclicity is checked in `config::validate`; this only keeps adjacency
/// information for scheduling. Node order is sorted by name so that every
/// traversal is deterministic.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<String, DagNode>,
}

impl DagGraph {
    /// Build the full DAG from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let edges = cfg
            .task
            .iter()
            .map(|(name, task)| (name.clone(), task.after.clone()));
        Self::from_edges(edges)
    }

    /// Build a DAG from `(task, deps)` pairs. Deps that are not themselves
    /// listed as tasks are dropped.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut nodes: BTreeMap<String, DagNode> = edges
            .into_iter()
            .map(|(name, deps)| {
                (
                    name,
                    DagNode {
                        deps,
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        let names: Vec<String> = nodes.keys().cloned().collect();
        for name in &names {
            if let Some(node) = nodes.get_mut(name) {
                node.deps.retain(|d| names.contains(d));
            }
        }

        for name in &names {
            let deps = nodes.get(name).map(|n| n.deps.clone()).unwrap_or_default();
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        Self { nodes }
    }

    /// The subgraph needed to run `target`: the task itself plus all of its
    /// transitive dependencies.
    pub fn subgraph_for(&self, target: &str) -> Result<DagGraph> {
        if !self.contains(target) {
            return Err(AssetdagError::TaskNotFound(target.to_string()));
        }

        let keep = self.ancestors_inclusive(target);
        let edges = keep
            .iter()
            .map(|name| (name.clone(), self.dependencies_of(name).to_vec()));
        Ok(Self::from_edges(edges))
    }

    /// `name` and everything it transitively depends on.
    pub fn ancestors_inclusive(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![name.to_string()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            stack.extend(self.dependencies_of(&current).iter().cloned());
        }

        seen
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All task names, sorted.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Tasks without dependencies, sorted.
    pub fn roots(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.deps.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Immediate dependencies of a task (the tasks listed in its `after`).
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
