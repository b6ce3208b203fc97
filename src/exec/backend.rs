// src/exec/backend.rs

//! Pluggable executor backend.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw channel, so
//! tests can swap in a fake that records dispatched tasks and answers with
//! `RuntimeEvent`s directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::pipeline::PipelineContext;

use super::executor_loop::spawn_executor;

/// How scheduled tasks get executed.
pub trait ExecutorBackend: Send {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: forwards tasks to the background executor loop,
/// which runs build passes and the static server.
#[derive(Debug)]
pub struct PipelineExecutor {
    tx: mpsc::Sender<ScheduledTask>,
}

impl PipelineExecutor {
    /// Spawns the executor loop immediately.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, ctx: Arc<PipelineContext>) -> Self {
        let tx = spawn_executor(runtime_tx, ctx);
        Self { tx }
    }
}

impl ExecutorBackend for PipelineExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task)
                    .await
                    .map_err(|err| anyhow!("executor loop is gone: {err}"))?;
            }
            Ok(())
        })
    }
}
