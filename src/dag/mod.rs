// src/dag/mod.rs

//! DAG representation and scheduling.
//!
//! - [`graph`] holds the task DAG and subgraph selection.
//! - [`scheduler`] is the per-run state machine deciding which tasks are
//!   ready and when dependents can be scheduled.
//! - [`task_info`] provides task metadata and scheduled task types.
//! - [`scheduler_step`] is the result type for manual stepping.
//! - [`state_manager`] implements the per-run state transitions.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, TaskRunState};
