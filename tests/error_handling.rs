// tests/error_handling.rs

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use assetdag::config::{load_and_validate, load_for_cli};
use assetdag::errors::AssetdagError;
use assetdag::types::{Preset, Step, TriggerWhileRunningBehaviour};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str, needle: &str) {
    let file = config_file(contents);
    match load_and_validate(file.path()) {
        Err(AssetdagError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should contain {needle:?}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    let file = config_file(
        r#"
[task.A]
steps = ["copy"]
after = ["B"]

[task.B]
steps = ["clean"]
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(AssetdagError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('A') || msg.contains('B'));
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_returns_config_error() {
    expect_config_error(
        r#"
[task.build]
steps = ["copy"]
after = ["prepare"]
"#,
        "unknown dependency 'prepare'",
    );
}

#[test]
fn test_self_dependency_is_rejected() {
    expect_config_error(
        r#"
[task.build]
steps = ["copy"]
after = ["build"]
"#,
        "cannot depend on itself",
    );
}

#[test]
fn test_serve_must_be_last_step() {
    expect_config_error(
        r#"
[task.dev]
steps = ["serve", "copy"]
"#,
        "must be the last step",
    );
}

#[test]
fn test_only_one_task_may_serve() {
    expect_config_error(
        r#"
[task.a]
steps = ["serve"]

[task.b]
steps = ["copy", "serve"]
"#,
        "only one task may contain `serve`",
    );
}

#[test]
fn test_global_sanity_checks() {
    expect_config_error("[config]\nqueue_length = 0\n", "queue_length");
    expect_config_error("[fingerprint]\ntoken_length = 0\n", "token_length");
    expect_config_error("[fingerprint]\ntoken_length = 65\n", "token_length");
    expect_config_error("[serve]\nbase_path = \"assets\"\n", "base_path");
    expect_config_error("[paths]\ninclude = []\n", "include");
    expect_config_error("[paths]\nsrc = \"/var/www/src\"\n", "[paths].src must be relative");
}

#[test]
fn test_unknown_step_is_a_toml_error() {
    let file = config_file(
        r#"
[task.build]
steps = ["minify"]
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetdagError::TomlError(_))
    ));
}

#[test]
fn test_empty_file_expands_minimal_preset() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    let names: Vec<&str> = cfg.task.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["build", "clean", "default"]);
    assert_eq!(cfg.task["build"].steps, vec![Step::Copy]);
    assert_eq!(cfg.task["build"].after, vec!["clean".to_string()]);
    assert!(cfg.task["default"].steps.is_empty());
    assert_eq!(cfg.config.queue_length, 1);
    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
}

#[test]
fn test_extended_preset_from_file() {
    let file = config_file(
        r#"
[config]
preset = "extended"
triggered_while_running_behaviour = "cancel"

[paths]
src = "site"
out = "public"

[serve]
addr = "127.0.0.1:9000"
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.preset, Preset::Extended);
    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(
        cfg.task["build"].steps,
        vec![Step::Copy, Step::Fingerprint, Step::Rewrite]
    );
    assert_eq!(cfg.task["apimocker"].steps, vec![Step::Serve]);
    assert_eq!(cfg.task["default"].after, vec!["apimocker".to_string()]);
    assert_eq!(cfg.task["clean"].watch, Some(vec!["site/**".to_string()]));
    assert_eq!(cfg.serve.addr, "127.0.0.1:9000");
    assert_eq!(cfg.serve.base_path, "/");
}

#[test]
fn test_declared_tasks_replace_preset() {
    let file = config_file(
        r#"
[config]
preset = "extended"

[task.only]
steps = ["copy"]
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.task.keys().collect::<Vec<_>>(), vec!["only"]);
}

#[test]
fn test_cli_preset_override_wins() {
    let file = config_file("[config]\npreset = \"minimal\"\n");
    let cfg = load_for_cli(file.path(), Some(Preset::Extended)).unwrap();
    assert!(cfg.task.contains_key("apimocker"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    match load_for_cli(&missing, None) {
        Err(AssetdagError::IoError(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("Expected IoError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_default_config_falls_back_to_preset() {
    // Only meaningful when the crate root has no Assetdag.toml of its own.
    let default = Path::new(assetdag::cli::DEFAULT_CONFIG);
    if default.exists() {
        return;
    }
    let cfg = load_for_cli(default, Some(Preset::Minimal)).unwrap();
    assert!(cfg.task.contains_key("clean"));
    assert!(!cfg.task.contains_key("apimocker"));
}

#[test]
fn test_tasks_failed_message_lists_names() {
    let err = AssetdagError::TasksFailed(vec!["build".into(), "default".into()]);
    assert_eq!(err.to_string(), "Task(s) failed: build, default");
}
