// src/config/preset.rs

//! Built-in task tables.

use std::collections::BTreeMap;

use crate::config::model::{PathsSection, TaskConfig};
use crate::types::{Preset, Step};

/// Expand a preset into a full task table.
///
/// The `extended` preset watches `<paths.src>/**` on `clean`, so any source
/// change re-runs the whole chain below it.
pub fn preset_tasks(preset: Preset, paths: &PathsSection) -> BTreeMap<String, TaskConfig> {
    let mut tasks = BTreeMap::new();

    match preset {
        Preset::Minimal => {
            tasks.insert("clean".to_string(), task(&[Step::Clean], &[]));
            tasks.insert("build".to_string(), task(&[Step::Copy], &["clean"]));
            tasks.insert("default".to_string(), task(&[], &["build"]));
        }
        Preset::Extended => {
            let mut clean = task(&[Step::Clean], &[]);
            clean.watch = Some(vec![source_watch_glob(paths)]);
            tasks.insert("clean".to_string(), clean);
            tasks.insert(
                "build".to_string(),
                task(&[Step::Copy, Step::Fingerprint, Step::Rewrite], &["clean"]),
            );
            tasks.insert("apimocker".to_string(), task(&[Step::Serve], &["build"]));
            tasks.insert("default".to_string(), task(&[], &["apimocker"]));
        }
    }

    tasks
}

fn task(steps: &[Step], after: &[&str]) -> TaskConfig {
    TaskConfig {
        steps: steps.to_vec(),
        after: after.iter().map(|s| s.to_string()).collect(),
        ..TaskConfig::default()
    }
}

/// `src` -> `src/**`, always with forward slashes.
fn source_watch_glob(paths: &PathsSection) -> String {
    let src = paths.src.to_string_lossy().replace('\\', "/");
    let src = src.trim_end_matches('/');
    let src = src.strip_prefix("./").unwrap_or(src);
    if src.is_empty() || src == "." {
        "**".to_string()
    } else {
        format!("{src}/**")
    }
}
