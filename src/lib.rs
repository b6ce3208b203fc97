// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_for_cli;
use crate::config::model::ConfigFile;
use crate::dag::Scheduler;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::exec::PipelineExecutor;
use crate::fs::RealFileSystem;
use crate::pipeline::PipelineContext;
use crate::watch::TaskWatchProfile;

/// Entry point used by `main.rs`.
///
/// Wires together config loading, the scheduler for the requested task's
/// subgraph, the pipeline executor, the file watcher (only when the
/// subgraph serves) and Ctrl-C handling.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_for_cli(&config_path, args.preset)?;

    if args.list {
        print_task_list(&cfg);
        return Ok(());
    }

    let scheduler = Scheduler::for_target(&cfg, &args.task)?;

    if args.dry_run {
        print_dry_run(&cfg, &scheduler);
        return Ok(());
    }

    let watch_mode = scheduler.has_long_lived_task();
    let project_root = config_root_dir(&config_path);
    let ctx = Arc::new(PipelineContext::from_config(
        &cfg,
        &project_root,
        Arc::new(RealFileSystem),
    ));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = PipelineExecutor::new(rt_tx.clone(), Arc::clone(&ctx));

    let _watcher_handle = if watch_mode {
        let (_defaults, profiles) = crate::watch::build_profiles_from_config(&cfg)?;
        let profiles: Vec<TaskWatchProfile> = profiles
            .into_iter()
            .filter(|p| scheduler.graph().contains(p.name()))
            .collect();
        Some(crate::watch::spawn_watcher(
            project_root.clone(),
            profiles,
            rt_tx.clone(),
        )?)
    } else {
        None
    };

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "cannot listen for Ctrl-C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let roots = scheduler.roots();
    info!(task = %args.task, ?roots, watch_mode, "seeding initial run");

    for task in roots {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::Manual,
            })
            .await?;
    }

    let options = if watch_mode {
        RuntimeOptions::watch()
    } else {
        RuntimeOptions::one_shot()
    };

    let core = CoreRuntime::new(
        scheduler,
        cfg.config.triggered_while_running_behaviour,
        cfg.config.queue_length,
        options,
    );

    Runtime::new(core, rt_rx, executor).run().await?;
    Ok(())
}

/// Directory relative paths in the config are resolved against: the config
/// file's parent, or the working directory for a bare file name.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_task_list(cfg: &ConfigFile) {
    for (name, task) in cfg.tasks() {
        let steps: Vec<String> = task.steps.iter().map(|s| s.to_string()).collect();
        if steps.is_empty() {
            println!("{name}");
        } else {
            println!("{name}  [{}]", steps.join(", "));
        }
    }
}

fn print_dry_run(cfg: &ConfigFile, scheduler: &Scheduler) {
    println!("assetdag dry-run");
    println!("  config.preset = {:?}", cfg.config.preset);
    println!(
        "  config.triggered_while_running_behaviour = {:?}",
        cfg.config.triggered_while_running_behaviour
    );
    println!("  config.queue_length = {}", cfg.config.queue_length);
    println!("  paths.src = {}", cfg.paths.src.display());
    println!("  paths.out = {}", cfg.paths.out.display());
    println!();

    let names: Vec<&str> = scheduler.task_names().collect();
    println!("tasks ({}):", names.len());
    for name in names {
        let Some(task) = cfg.task.get(name) else {
            continue;
        };
        println!("  - {name}");
        if !task.steps.is_empty() {
            let steps: Vec<String> = task.steps.iter().map(|s| s.to_string()).collect();
            println!("      steps: {}", steps.join(" -> "));
        }
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if let Some(ref watch) = task.watch {
            if !watch.is_empty() {
                println!("      watch: {:?}", watch);
            }
        }
        if let Some(ref exclude) = task.exclude {
            if !exclude.is_empty() {
                println!("      exclude: {:?}", exclude);
            }
        }
    }

    if scheduler.has_long_lived_task() {
        println!();
        println!("serve: http://{}{}", cfg.serve.addr, cfg.serve.base_path);
    }

    debug!("dry-run complete (no execution)");
}
