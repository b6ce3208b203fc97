// src/engine/runtime.rs

use std::fmt;
use std::ops::ControlFlow;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{AssetdagError, Result};
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Async shell: pulls events off the channel, lets the core decide, and
/// carries out the resulting commands against an [`ExecutorBackend`].
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    events: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, events: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            events,
            executor,
        }
    }

    /// Returns `Err(TasksFailed)` when a failed run is fatal, `Ok` on a
    /// one-shot exit, shutdown request or closed channel.
    pub async fn run(mut self) -> Result<()> {
        info!("runtime started");

        while let Some(event) = self.events.recv().await {
            debug!(?event, "event");
            let step = self.core.step(event);

            for command in step.commands {
                if let ControlFlow::Break(failed) = self.carry_out(command).await? {
                    return Err(AssetdagError::TasksFailed(failed));
                }
            }

            if !step.keep_running {
                info!("runtime stopping");
                return Ok(());
            }
        }

        info!("event channel closed; runtime stopping");
        Ok(())
    }

    async fn carry_out(&mut self, command: CoreCommand) -> Result<ControlFlow<Vec<String>>> {
        match command {
            CoreCommand::DispatchTasks(tasks) => {
                debug!(
                    tasks = ?tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                    "dispatching"
                );
                self.executor.spawn_ready_tasks(tasks).await?;
            }
            CoreCommand::RequestExit => info!("all tasks finished"),
            CoreCommand::AbortRun(failed) => return Ok(ControlFlow::Break(failed)),
        }
        Ok(ControlFlow::Continue(()))
    }
}
