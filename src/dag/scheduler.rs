// src/dag/scheduler.rs

use tracing::{debug, info, warn};

use crate::config::model::ConfigFile;
use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{deps_satisfied, StateManager, TaskTable};
use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{TaskName, TaskOutcome};
use crate::errors::Result;

/// The task graph plus the state of the current run.
///
/// A run starts with [`Scheduler::start_new_run`] (or implicitly on the
/// first trigger), pulls triggered tasks and their dependents in, hands out
/// tasks whose dependencies are done, and ends when no task is pending or
/// running. A failure fails everything downstream of it in the same run.
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: TaskTable,
    runs_started: u64,
    active_run: Option<u64>,
}

impl Scheduler {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::over(cfg, DagGraph::from_config(cfg))
    }

    /// Only `target` and what it transitively depends on.
    pub fn for_target(cfg: &ConfigFile, target: &str) -> Result<Self> {
        let graph = DagGraph::from_config(cfg).subgraph_for(target)?;
        Ok(Self::over(cfg, graph))
    }

    fn over(cfg: &ConfigFile, graph: DagGraph) -> Self {
        let mut tasks = TaskTable::new();
        for name in graph.tasks() {
            if let Some(task) = cfg.task.get(name) {
                let deps = graph.dependencies_of(name).to_vec();
                tasks.insert(name.to_string(), TaskInfo::new(name, task, deps));
            }
        }

        Self {
            graph,
            tasks,
            runs_started: 0,
            active_run: None,
        }
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Sorted task names.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    pub fn roots(&self) -> Vec<TaskName> {
        self.graph.roots()
    }

    pub fn has_long_lived_task(&self) -> bool {
        self.tasks.values().any(|t| t.long_lived)
    }

    pub fn is_idle(&self) -> bool {
        self.active_run.is_none()
    }

    pub fn current_run_id(&self) -> Option<u64> {
        self.active_run
    }

    /// `None` for a task outside the graph.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks.get(task).map(|info| info.state)
    }

    /// Empty when idle.
    pub fn tasks_in_current_run(&self) -> Vec<TaskName> {
        self.tasks
            .values()
            .filter(|info| info.state != TaskRunState::NotInRun)
            .map(|info| info.name.clone())
            .collect()
    }

    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        Some(deps_satisfied(&self.tasks, info))
    }

    /// Reset per-run state. Success history survives so tasks left out of
    /// the new run still satisfy their dependents.
    pub fn start_new_run(&mut self) {
        self.runs_started += 1;
        self.active_run = Some(self.runs_started);
        for info in self.tasks.values_mut() {
            info.state = TaskRunState::NotInRun;
        }
        debug!(run_id = self.runs_started, "new DAG run");
    }

    pub fn handle_trigger(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.step_trigger(task).newly_scheduled
    }

    pub fn handle_progress(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.step_progress(task).newly_scheduled
    }

    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    pub fn step_trigger(&mut self, task: &str) -> SchedulerStep {
        let run_id = match self.active_run {
            Some(id) => id,
            None => {
                warn!(%task, "trigger while idle; starting a run");
                self.start_new_run();
                self.runs_started
            }
        };

        if !self.tasks.contains_key(task) {
            warn!(%task, "trigger for unknown task; ignoring");
        } else {
            self.state(run_id).enlist_downstream(task);
        }

        SchedulerStep {
            newly_scheduled: self.state(run_id).dispatch_ready(),
            newly_failed: Vec::new(),
            run_just_finished: self.close_if_settled(),
        }
    }

    /// A long-lived task is up: it counts as done for this run.
    pub fn step_progress(&mut self, task: &str) -> SchedulerStep {
        let Some(run_id) = self.running_in_active_run(task, "progress") else {
            return SchedulerStep::default();
        };

        if let Some(info) = self.tasks.get_mut(task) {
            info.succeed(run_id);
        }
        debug!(%task, run_id, "task reported progress");

        SchedulerStep {
            newly_scheduled: self.state(run_id).dispatch_ready(),
            newly_failed: Vec::new(),
            run_just_finished: self.close_if_settled(),
        }
    }

    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.running_in_active_run(task, "completion") else {
            return SchedulerStep::default();
        };

        let mut step = SchedulerStep::default();
        match outcome {
            TaskOutcome::Success => {
                if let Some(info) = self.tasks.get_mut(task) {
                    info.succeed(run_id);
                }
                debug!(%task, run_id, "task succeeded");
                step.newly_scheduled = self.state(run_id).dispatch_ready();
            }
            TaskOutcome::Failed(reason) => {
                if let Some(info) = self.tasks.get_mut(task) {
                    info.fail(run_id);
                }
                warn!(%task, run_id, %reason, "task failed; failing its dependents");
                step.newly_failed.push(task.to_string());
                step.newly_failed
                    .extend(self.state(run_id).fail_downstream(task));
            }
        }

        step.run_just_finished = self.close_if_settled();
        step
    }

    /// The active run id if `task` is currently running in it; stale or
    /// unknown reports are logged and dropped.
    fn running_in_active_run(&self, task: &str, what: &str) -> Option<u64> {
        let Some(run_id) = self.active_run else {
            warn!(%task, "{what} with no active run; ignoring");
            return None;
        };
        match self.tasks.get(task) {
            Some(info) if info.state == TaskRunState::Running => Some(run_id),
            Some(info) => {
                debug!(%task, state = ?info.state, "{what} for task not running; ignoring");
                None
            }
            None => {
                warn!(%task, "{what} from unknown task; ignoring");
                None
            }
        }
    }

    fn state(&mut self, run_id: u64) -> StateManager<'_> {
        StateManager::new(&self.graph, &mut self.tasks, run_id)
    }

    /// End the active run once nothing is pending or running. Returns `true`
    /// when this call did so.
    fn close_if_settled(&mut self) -> bool {
        let Some(run_id) = self.active_run else {
            return false;
        };
        if self.tasks.values().any(|info| info.state.is_active()) {
            return false;
        }
        info!(run_id, "run finished; all tasks terminal");
        self.active_run = None;
        true
    }
}
