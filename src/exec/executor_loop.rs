// src/exec/executor_loop.rs

//! Background loop owning the running task instances.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::{refresh_serving_task, run_task};
use crate::pipeline::PipelineContext;

/// Spawn the executor loop and return the sender the backend feeds.
///
/// Each task runs in its own Tokio task. A long-lived task (the static
/// server) is bound at most once: scheduling it again while it still runs
/// re-runs its build steps against the live server and reports progress,
/// so dependents of the new run proceed.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: Arc<PipelineContext>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut long_lived: HashMap<String, JoinHandle<()>> = HashMap::new();

        while let Some(task) = rx.recv().await {
            handle_scheduled_task(task, &mut long_lived, &runtime_tx, &ctx).await;
        }

        for (name, handle) in long_lived.drain() {
            debug!(task = %name, "stopping long-lived task");
            handle.abort();
        }
        info!("executor loop finished (channel closed)");
    });

    tx
}

async fn handle_scheduled_task(
    task: ScheduledTask,
    long_lived: &mut HashMap<String, JoinHandle<()>>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    ctx: &Arc<PipelineContext>,
) {
    if task.long_lived
        && long_lived
            .get(&task.name)
            .is_some_and(|existing| !existing.is_finished())
    {
        debug!(task = %task.name, run_id = task.run_id, "long-lived task already running");
        tokio::spawn(refresh_serving_task(
            task,
            Arc::clone(ctx),
            runtime_tx.clone(),
        ));
        return;
    }

    let name = task.name.clone();
    let is_long_lived = task.long_lived;
    let rt_tx = runtime_tx.clone();
    let ctx = Arc::clone(ctx);

    let handle = tokio::spawn(async move {
        let spawn_name = task.name.clone();
        run_task(task, ctx, rt_tx).await;
        debug!(task = %spawn_name, "task runner future finished");
    });

    if is_long_lived {
        long_lived.insert(name, handle);
    }
}
