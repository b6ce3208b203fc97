// src/engine/mod.rs

//! Orchestration engine.
//!
//! Ties together the DAG scheduler, the trigger queue (what happens to
//! rebuild requests that arrive mid-run) and the main event loop reacting to
//! file-watch triggers, serve progress, task completion and shutdown.
//!
//! The pure state machine lives in [`core`]; the async shell in [`runtime`].

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a task for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// The task failed; the payload is the rendered error.
    Failed(String),
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Initial roots at startup.
    Manual,
    /// A source file changed.
    FileWatch,
}

/// Options shared by the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once the DAG is idle and nothing is queued (one-shot builds).
    pub exit_when_idle: bool,
    /// After the first run has finished cleanly, failed runs are only
    /// logged instead of stopping the runtime (watch mode).
    pub tolerate_failures_after_first_run: bool,
}

impl RuntimeOptions {
    pub fn one_shot() -> Self {
        Self {
            exit_when_idle: true,
            tolerate_failures_after_first_run: false,
        }
    }

    pub fn watch() -> Self {
        Self {
            exit_when_idle: false,
            tolerate_failures_after_first_run: true,
        }
    }
}

/// Events flowing into the runtime from watchers, executors, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A long-lived task (the static server) is up.
    TaskProgressed {
        task: TaskName,
    },
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod command;
pub mod core;
pub mod ledger;
pub mod queue;
pub mod runtime;

pub use command::{CoreCommand, CoreStep};
pub use self::core::CoreRuntime;
pub use ledger::{RunLedger, RunVerdict};
pub use queue::TriggerQueue;
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
