// src/engine/command.rs

use crate::dag::ScheduledTask;
use crate::engine::TaskName;

/// What the async shell must do after the core consumed an event.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    DispatchTasks(Vec<ScheduledTask>),
    /// One-shot mode with nothing left to do.
    RequestExit,
    /// A run ended with failures that are fatal under the current options.
    AbortRun(Vec<TaskName>),
}

#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn proceed(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    pub(crate) fn stop(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }

    /// Append a dispatch command unless `tasks` is empty.
    pub(crate) fn dispatch_into(commands: &mut Vec<CoreCommand>, tasks: Vec<ScheduledTask>) {
        if !tasks.is_empty() {
            commands.push(CoreCommand::DispatchTasks(tasks));
        }
    }
}
