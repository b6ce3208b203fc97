mod common;

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::mpsc;

use assetdag::engine::{RuntimeEvent, TriggerReason};
use assetdag::types::Preset;
use assetdag::watch::event_handler::{process_file_change, ChangeKind};
use assetdag::watch::patterns::{
    build_profiles_from_config, build_task_watch_profiles, RawTaskPatternSpec, TaskWatchProfile,
    WatchDefaults,
};
use assetdag::watch::spawn_watcher;

use crate::common::builders::ConfigFileBuilder;
use crate::common::{init_tracing, with_timeout, write_file};

fn spec(name: &str, watch: Option<&[&str]>, deps: &[&str]) -> RawTaskPatternSpec {
    RawTaskPatternSpec {
        name: name.to_string(),
        watch: watch.map(|w| w.iter().map(|s| s.to_string()).collect()),
        exclude: None,
        append_default_watch: false,
        append_default_exclude: false,
        deps: deps.iter().map(|s| s.to_string()).collect(),
    }
}

fn dep_map(profiles: &[TaskWatchProfile]) -> HashMap<String, Vec<String>> {
    profiles
        .iter()
        .map(|p| (p.name().to_string(), p.deps().to_vec()))
        .collect()
}

fn drain_triggers(rx: &mut mpsc::Receiver<RuntimeEvent>) -> Vec<String> {
    let mut triggered = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                assert_eq!(reason, TriggerReason::FileWatch);
                triggered.push(task);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    triggered
}

#[tokio::test]
async fn only_root_of_matching_chain_is_triggered() {
    with_timeout(async {
        // clean -> build -> serve, clean and build both watch src/**.
        let specs = vec![
            spec("clean", Some(&["src/**"]), &[]),
            spec("build", Some(&["src/**"]), &["clean"]),
            spec("serve", None, &["build"]),
        ];
        let profiles = build_task_watch_profiles(&WatchDefaults::default(), &specs).unwrap();
        let deps = dep_map(&profiles);

        let (tx, mut rx) = mpsc::channel(16);
        let root = PathBuf::from("/project");
        let notice = process_file_change(
            &root,
            &root.join("src/js/app.js"),
            ChangeKind::Modified,
            &profiles,
            &deps,
            &tx,
        )
        .await
        .expect("path should match");

        assert_eq!(notice.path, "src/js/app.js");
        assert_eq!(notice.tasks, vec!["clean".to_string()]);
        assert_eq!(
            notice.to_string(),
            "File src/js/app.js was modified, running tasks..."
        );
        assert_eq!(drain_triggers(&mut rx), vec!["clean".to_string()]);
    })
    .await;
}

#[tokio::test]
async fn unrelated_path_produces_no_notice() {
    with_timeout(async {
        let specs = vec![spec("clean", Some(&["src/**"]), &[])];
        let profiles = build_task_watch_profiles(&WatchDefaults::default(), &specs).unwrap();
        let deps = dep_map(&profiles);

        let (tx, mut rx) = mpsc::channel(16);
        let root = PathBuf::from("/project");
        let notice = process_file_change(
            &root,
            &root.join("out/app-0123456789.js"),
            ChangeKind::Created,
            &profiles,
            &deps,
            &tx,
        )
        .await;

        assert!(notice.is_none());
        assert!(drain_triggers(&mut rx).is_empty());
    })
    .await;
}

#[tokio::test]
async fn one_notice_per_event_path() {
    with_timeout(async {
        let specs = vec![spec("clean", Some(&["src/**"]), &[])];
        let profiles = build_task_watch_profiles(&WatchDefaults::default(), &specs).unwrap();
        let deps = dep_map(&profiles);

        let (tx, mut rx) = mpsc::channel(16);
        let root = PathBuf::from("/project");
        let mut notices = Vec::new();
        for (rel, kind) in [
            ("src/index.html", ChangeKind::Modified),
            ("src/css/site.css", ChangeKind::Deleted),
        ] {
            if let Some(n) =
                process_file_change(&root, &root.join(rel), kind, &profiles, &deps, &tx).await
            {
                notices.push(n.to_string());
            }
        }

        assert_eq!(
            notices,
            vec![
                "File src/index.html was modified, running tasks...".to_string(),
                "File src/css/site.css was deleted, running tasks...".to_string(),
            ]
        );
        assert_eq!(drain_triggers(&mut rx), vec!["clean", "clean"]);
    })
    .await;
}

#[test]
fn exclude_wins_over_watch() {
    let mut s = spec("clean", Some(&["src/**"]), &[]);
    s.exclude = Some(vec!["src/**/*.swp".to_string()]);
    let profiles = build_task_watch_profiles(&WatchDefaults::default(), &[s]).unwrap();

    assert!(profiles[0].matches("src/index.html"));
    assert!(!profiles[0].matches("src/.index.html.swp"));
}

#[test]
fn default_watch_applies_to_tasks_without_their_own() {
    let defaults = WatchDefaults {
        watch: vec!["assets/**".to_string()],
        exclude: vec![],
    };
    let mut own = spec("own", Some(&["src/**"]), &[]);
    own.append_default_watch = true;
    let specs = vec![spec("inherits", None, &[]), own, spec("plain", Some(&["lib/**"]), &[])];

    let profiles = build_task_watch_profiles(&defaults, &specs).unwrap();

    assert!(profiles[0].matches("assets/logo.png"));
    assert!(profiles[1].matches("assets/logo.png"));
    assert!(profiles[1].matches("src/app.js"));
    assert!(!profiles[2].matches("assets/logo.png"));
}

#[test]
fn extended_preset_watches_source_tree_on_clean() {
    let cfg = ConfigFileBuilder::new()
        .with_preset(Preset::Extended)
        .with_paths("site", "dist")
        .build();

    let (_defaults, profiles) = build_profiles_from_config(&cfg).unwrap();
    let clean = profiles.iter().find(|p| p.name() == "clean").unwrap();
    let build = profiles.iter().find(|p| p.name() == "build").unwrap();

    assert!(clean.matches("site/index.html"));
    assert!(!clean.matches("dist/index.html"));
    assert!(!build.matches("site/index.html"));
}

#[tokio::test]
async fn real_watcher_triggers_clean_for_source_writes_only() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::create_dir_all(dir.path().join("out")).unwrap();

    let cfg = ConfigFileBuilder::new().with_preset(Preset::Extended).build();
    let (_defaults, profiles) = build_profiles_from_config(&cfg).unwrap();
    let (tx, mut rx) = mpsc::channel(64);
    let _watcher = spawn_watcher(dir.path(), profiles, tx).unwrap();

    // Output first: events are dispatched in arrival order, so the first
    // trigger seen must come from the source write.
    write_file(dir.path(), "out/a.js", b"built");
    write_file(dir.path(), "src/a.js", b"source");

    match with_timeout(rx.recv()).await {
        Some(RuntimeEvent::TaskTriggered { task, reason }) => {
            assert_eq!(task, "clean");
            assert_eq!(reason, TriggerReason::FileWatch);
        }
        other => panic!("expected a clean trigger, got {other:?}"),
    }

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let rest = drain_triggers(&mut rx);
    assert!(rest.iter().all(|task| task == "clean"), "unexpected triggers: {rest:?}");
}

#[tokio::test]
async fn real_watcher_ignores_output_writes() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::create_dir_all(dir.path().join("out")).unwrap();

    let cfg = ConfigFileBuilder::new().with_preset(Preset::Extended).build();
    let (_defaults, profiles) = build_profiles_from_config(&cfg).unwrap();
    let (tx, mut rx) = mpsc::channel(64);
    let _watcher = spawn_watcher(dir.path(), profiles, tx).unwrap();

    write_file(dir.path(), "out/index.html", b"built");
    write_file(dir.path(), "out/js/app.js", b"built");

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(drain_triggers(&mut rx).is_empty());
}

#[test]
fn invalid_glob_is_reported() {
    let specs = vec![spec("clean", Some(&["src/[unclosed"]), &[])];
    let err = build_task_watch_profiles(&WatchDefaults::default(), &specs).unwrap_err();
    assert!(format!("{err:#}").contains("clean"));
}
