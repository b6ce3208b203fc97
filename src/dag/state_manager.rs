// src/dag/state_manager.rs

//! Per-run state transitions over the scheduler's task table.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::dag::DagGraph;
use crate::engine::TaskName;

pub type TaskTable = BTreeMap<TaskName, TaskInfo>;

/// Borrowed view used for one scheduler step.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    tasks: &'a mut TaskTable,
    run_id: u64,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a DagGraph, tasks: &'a mut TaskTable, run_id: u64) -> Self {
        Self {
            graph,
            tasks,
            run_id,
        }
    }

    /// Pull `start` and everything downstream of it into the run. Tasks that
    /// already take part keep their state.
    pub fn enlist_downstream(&mut self, start: &str) {
        let graph = self.graph;
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut frontier: Vec<&str> = vec![start];

        while let Some(name) = frontier.pop() {
            if !seen.insert(name) {
                continue;
            }
            match self.tasks.get_mut(name) {
                Some(info) if info.state == TaskRunState::NotInRun => {
                    info.state = TaskRunState::Pending;
                    debug!(task = %name, run_id = self.run_id, "pending");
                }
                Some(_) => {}
                None => warn!(task = %name, "graph node missing from task table"),
            }
            frontier.extend(graph.dependents_of(name).iter().map(String::as_str));
        }
    }

    /// Fail every active task downstream of `origin`. Returns their names;
    /// `origin` itself is not included.
    pub fn fail_downstream(&mut self, origin: &str) -> Vec<TaskName> {
        let graph = self.graph;
        let mut failed = Vec::new();
        let mut frontier: Vec<&str> = graph
            .dependents_of(origin)
            .iter()
            .map(String::as_str)
            .collect();

        while let Some(name) = frontier.pop() {
            let Some(info) = self.tasks.get_mut(name) else {
                continue;
            };
            if !info.state.is_active() {
                continue;
            }
            info.state = TaskRunState::DoneFailed;
            debug!(task = %name, upstream = %origin, "blocked by failed dependency");
            failed.push(info.name.clone());
            frontier.extend(graph.dependents_of(name).iter().map(String::as_str));
        }

        failed
    }

    /// Move pending tasks whose dependencies are satisfied to `Running`.
    pub fn dispatch_ready(&mut self) -> Vec<ScheduledTask> {
        let ready: Vec<TaskName> = self
            .tasks
            .values()
            .filter(|info| info.state == TaskRunState::Pending && deps_satisfied(self.tasks, info))
            .map(|info| info.name.clone())
            .collect();

        let mut scheduled = Vec::with_capacity(ready.len());
        for name in ready {
            let Some(info) = self.tasks.get_mut(&name) else {
                continue;
            };
            info!(
                task = %info.name,
                run_id = self.run_id,
                rerun = info.has_run_before(),
                steps = ?info.steps,
                "scheduling task"
            );
            info.state = TaskRunState::Running;
            scheduled.push(ScheduledTask::new(info, self.run_id));
        }
        scheduled
    }
}

/// Whether every dependency of `info` lets it start in the current run.
pub fn deps_satisfied(tasks: &TaskTable, info: &TaskInfo) -> bool {
    info.deps.iter().all(|dep| match tasks.get(dep) {
        Some(dep_info) => dep_info.satisfies_dependents(),
        None => {
            warn!(task = %info.name, %dep, "dependency missing from task table");
            false
        }
    })
}
