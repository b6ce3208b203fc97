// src/exec/task_runner.rs

//! Running one scheduled task: its build steps, then (optionally) the
//! static server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::pipeline::{run_steps, PipelineContext};
use crate::serve::StaticServer;
use crate::types::Step;

/// Run `task` and report the outcome to the runtime.
///
/// Build-only tasks report `TaskCompleted`. A task ending in `serve`
/// reports `TaskProgressed` once the socket is bound and then keeps serving
/// until the process exits. Any error before that point is a failure.
pub async fn run_task(
    task: ScheduledTask,
    ctx: Arc<PipelineContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let task_name = task.name.clone();
    let run_id = task.run_id;

    if let Err(err) = run_task_inner(task, ctx, &runtime_tx).await {
        report_failure(&runtime_tx, task_name, run_id, err).await;
    }
}

/// Re-run the build steps of a serving task whose server is still up.
///
/// The running server keeps serving the output root, so once the steps
/// succeed the task reports `TaskProgressed` like a fresh bind would.
pub async fn refresh_serving_task(
    task: ScheduledTask,
    ctx: Arc<PipelineContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let task_name = task.name.clone();
    let run_id = task.run_id;
    info!(task = %task_name, run_id, "server already up; re-running build steps");

    let result = match run_build_steps(&task, &ctx).await {
        Ok(()) => {
            report(
                &runtime_tx,
                RuntimeEvent::TaskProgressed {
                    task: task_name.clone(),
                },
            )
            .await
        }
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        report_failure(&runtime_tx, task_name, run_id, err).await;
    }
}

async fn run_task_inner(
    task: ScheduledTask,
    ctx: Arc<PipelineContext>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> Result<()> {
    let serves = task.steps.contains(&Step::Serve);

    info!(
        task = %task.name,
        run_id = task.run_id,
        steps = ?task.steps,
        "starting task"
    );

    run_build_steps(&task, &ctx).await?;

    if !serves {
        return report(
            runtime_tx,
            RuntimeEvent::TaskCompleted {
                task: task.name.clone(),
                outcome: TaskOutcome::Success,
            },
        )
        .await;
    }

    let server = StaticServer::bind(ctx.serve.clone()).await?;
    let url = server.url()?;
    println!("[assetdag] Serving {} at {}", ctx.serve.root.display(), url);
    info!(task = %task.name, %url, "static server listening");

    report(
        runtime_tx,
        RuntimeEvent::TaskProgressed {
            task: task.name.clone(),
        },
    )
    .await?;

    if let Err(err) = server.run().await {
        warn!(task = %task.name, error = %err, "static server stopped");
    }
    Ok(())
}

/// Every step except `serve`, on the blocking pool.
async fn run_build_steps(task: &ScheduledTask, ctx: &Arc<PipelineContext>) -> Result<()> {
    let build_steps: Vec<Step> = task
        .steps
        .iter()
        .copied()
        .filter(|s| !s.is_long_lived())
        .collect();
    if build_steps.is_empty() {
        return Ok(());
    }

    let pass_ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || run_steps(&pass_ctx, &build_steps))
        .await
        .context("build pass panicked")??;
    Ok(())
}

async fn report_failure(
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    task: String,
    run_id: u64,
    err: anyhow::Error,
) {
    let reason = format!("{err:#}");
    error!(task = %task, run_id, error = %reason, "task failed");
    let _ = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task,
            outcome: TaskOutcome::Failed(reason),
        })
        .await;
}

async fn report(runtime_tx: &mpsc::Sender<RuntimeEvent>, event: RuntimeEvent) -> Result<()> {
    runtime_tx
        .send(event)
        .await
        .context("sending task event to runtime")
}
