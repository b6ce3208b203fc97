// tests/runtime_fake_executor.rs

mod common;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use assetdag::config::ConfigFile;
use assetdag::dag::Scheduler;
use assetdag::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use assetdag::errors::AssetdagError;
use assetdag::types::{Preset, Step};

use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};
use crate::common::{init_tracing, with_timeout, FakeExecutor};

type Executed = Arc<Mutex<Vec<String>>>;

async fn seed_roots(tx: &mpsc::Sender<RuntimeEvent>, scheduler: &Scheduler) {
    for task in scheduler.roots() {
        tx.send(RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::Manual,
        })
        .await
        .unwrap();
    }
}

fn runtime_for(
    cfg: &ConfigFile,
    target: &str,
    options: RuntimeOptions,
    failing: Arc<Mutex<HashSet<String>>>,
) -> (
    Runtime<FakeExecutor>,
    mpsc::Sender<RuntimeEvent>,
    Scheduler,
    Executed,
) {
    let (tx, rx) = mpsc::channel(64);
    let executed: Executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed)).with_failing(failing);

    let scheduler = Scheduler::for_target(cfg, target).unwrap();
    let seed = Scheduler::for_target(cfg, target).unwrap();
    let core = CoreRuntime::new(
        scheduler,
        cfg.config.triggered_while_running_behaviour,
        cfg.config.queue_length,
        options,
    );
    (Runtime::new(core, rx, executor), tx, seed, executed)
}

#[tokio::test]
async fn minimal_preset_runs_chain_in_order_and_exits() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_preset(Preset::Minimal).build();
    let (runtime, tx, seed, executed) =
        runtime_for(&cfg, "default", RuntimeOptions::one_shot(), Default::default());

    seed_roots(&tx, &seed).await;
    with_timeout(runtime.run()).await.unwrap();

    assert_eq!(*executed.lock().unwrap(), vec!["clean", "build", "default"]);
}

#[tokio::test]
async fn invoking_a_task_runs_only_its_dependencies() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_preset(Preset::Extended).build();
    let (runtime, tx, seed, executed) =
        runtime_for(&cfg, "build", RuntimeOptions::one_shot(), Default::default());

    assert!(!seed.has_long_lived_task());
    seed_roots(&tx, &seed).await;
    with_timeout(runtime.run()).await.unwrap();

    assert_eq!(*executed.lock().unwrap(), vec!["clean", "build"]);
}

#[tokio::test]
async fn one_shot_failure_aborts_with_failed_tasks() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_preset(Preset::Minimal).build();
    let failing = Arc::new(Mutex::new(HashSet::from(["build".to_string()])));
    let (runtime, tx, seed, executed) =
        runtime_for(&cfg, "default", RuntimeOptions::one_shot(), failing);

    seed_roots(&tx, &seed).await;
    let err = with_timeout(runtime.run()).await.unwrap_err();

    match err {
        AssetdagError::TasksFailed(failed) => {
            assert_eq!(failed, vec!["build".to_string(), "default".to_string()]);
        }
        other => panic!("expected TasksFailed, got {other:?}"),
    }
    // `default` is failed by its upstream, never executed.
    assert_eq!(*executed.lock().unwrap(), vec!["clean", "build"]);
}

#[tokio::test]
async fn watch_mode_serves_then_rebuilds_on_trigger() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_preset(Preset::Extended).build();
    let (runtime, tx, seed, executed) =
        runtime_for(&cfg, "default", RuntimeOptions::watch(), Default::default());

    assert!(seed.has_long_lived_task());
    seed_roots(&tx, &seed).await;
    let handle = tokio::spawn(runtime.run());

    // Wait for the initial run to reach `default`.
    with_timeout(async {
        while !executed.lock().unwrap().contains(&"default".to_string()) {
            tokio::task::yield_now().await;
        }
    })
    .await;

    tx.send(RuntimeEvent::TaskTriggered {
        task: "clean".to_string(),
        reason: TriggerReason::FileWatch,
    })
    .await
    .unwrap();

    with_timeout(async {
        while executed.lock().unwrap().len() < 8 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(handle).await.unwrap().unwrap();

    assert_eq!(
        *executed.lock().unwrap(),
        vec![
            "clean", "build", "apimocker", "default", "clean", "build", "apimocker", "default"
        ]
    );
}

#[tokio::test]
async fn watch_mode_tolerates_failed_rebuild() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_preset(Preset::Extended).build();
    let failing: Arc<Mutex<HashSet<String>>> = Default::default();
    let (runtime, tx, seed, executed) =
        runtime_for(&cfg, "default", RuntimeOptions::watch(), Arc::clone(&failing));

    seed_roots(&tx, &seed).await;
    let handle = tokio::spawn(runtime.run());

    with_timeout(async {
        while executed.lock().unwrap().len() < 4 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    failing.lock().unwrap().insert("build".to_string());
    tx.send(RuntimeEvent::TaskTriggered {
        task: "clean".to_string(),
        reason: TriggerReason::FileWatch,
    })
    .await
    .unwrap();

    with_timeout(async {
        while executed.lock().unwrap().len() < 6 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    // Still alive: a later rebuild after fixing the sources goes through.
    failing.lock().unwrap().clear();
    tx.send(RuntimeEvent::TaskTriggered {
        task: "clean".to_string(),
        reason: TriggerReason::FileWatch,
    })
    .await
    .unwrap();

    with_timeout(async {
        while executed.lock().unwrap().len() < 10 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    with_timeout(handle).await.unwrap().unwrap();

    let executed = executed.lock().unwrap().clone();
    assert_eq!(&executed[4..6], &["clean", "build"]);
    assert_eq!(&executed[6..10], &["clean", "build", "apimocker", "default"]);
}

#[tokio::test]
async fn watch_mode_aborts_when_first_run_fails() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().with_preset(Preset::Extended).build();
    let failing = Arc::new(Mutex::new(HashSet::from(["build".to_string()])));
    let (runtime, tx, seed, _executed) =
        runtime_for(&cfg, "default", RuntimeOptions::watch(), failing);

    seed_roots(&tx, &seed).await;
    let err = with_timeout(runtime.run()).await.unwrap_err();
    assert!(matches!(err, AssetdagError::TasksFailed(ref f) if f.contains(&"build".to_string())));
}

#[tokio::test]
async fn custom_task_table_runs_steps_tasks() {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_task("wipe", TaskConfigBuilder::new().step(Step::Clean).build())
        .with_task(
            "assets",
            TaskConfigBuilder::new()
                .steps(&[Step::Copy, Step::Fingerprint])
                .after("wipe")
                .build(),
        )
        .with_task(
            "refs",
            TaskConfigBuilder::new().step(Step::Rewrite).after("assets").build(),
        )
        .build();
    let (runtime, tx, seed, executed) =
        runtime_for(&cfg, "refs", RuntimeOptions::one_shot(), Default::default());

    seed_roots(&tx, &seed).await;
    with_timeout(runtime.run()).await.unwrap();

    assert_eq!(*executed.lock().unwrap(), vec!["wipe", "assets", "refs"]);
}
