// src/dag/task_info.rs

use crate::config::model::TaskConfig;
use crate::engine::TaskName;
use crate::types::Step;

/// Where a task stands in the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskRunState {
    /// Not participating in the current run (or no run is active).
    #[default]
    NotInRun,
    /// In the run, waiting on dependencies.
    Pending,
    /// Dispatched to the executor.
    Running,
    /// Finished, or (for `serve`) reported that it is up.
    DoneSuccess,
    /// Failed, or blocked by a failed dependency.
    DoneFailed,
}

impl TaskRunState {
    /// Pending or running.
    pub fn is_active(self) -> bool {
        matches!(self, TaskRunState::Pending | TaskRunState::Running)
    }
}

/// One row of the scheduler's task table.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    pub steps: Vec<Step>,
    pub long_lived: bool,
    /// Direct dependencies that are part of the scheduled graph.
    pub deps: Vec<TaskName>,
    pub state: TaskRunState,
    /// Run id of the most recent success, kept across runs.
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
}

impl TaskInfo {
    pub fn new(name: &str, cfg: &TaskConfig, deps: Vec<TaskName>) -> Self {
        Self {
            name: name.to_string(),
            steps: cfg.steps.clone(),
            long_lived: cfg.is_long_lived(),
            deps,
            state: TaskRunState::NotInRun,
            last_success: None,
            last_failure: None,
        }
    }

    /// Whether this task, seen as a dependency, lets its dependents start.
    /// Outside the run, any earlier success counts.
    pub fn satisfies_dependents(&self) -> bool {
        match self.state {
            TaskRunState::DoneSuccess => true,
            TaskRunState::NotInRun => self.last_success.is_some(),
            _ => false,
        }
    }

    pub fn succeed(&mut self, run_id: u64) {
        self.state = TaskRunState::DoneSuccess;
        self.last_success = Some(run_id);
    }

    pub fn fail(&mut self, run_id: u64) {
        self.state = TaskRunState::DoneFailed;
        self.last_failure = Some(run_id);
    }

    pub fn has_run_before(&self) -> bool {
        self.last_success.is_some() || self.last_failure.is_some()
    }
}

/// A task the scheduler wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub steps: Vec<Step>,
    pub long_lived: bool,
    /// Shared by every task dispatched within one run.
    pub run_id: u64,
}

impl ScheduledTask {
    pub fn new(info: &TaskInfo, run_id: u64) -> Self {
        Self {
            name: info.name.clone(),
            steps: info.steps.clone(),
            long_lived: info.long_lived,
            run_id,
        }
    }
}
