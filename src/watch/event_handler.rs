// src/watch/event_handler.rs

//! Turning filesystem events into task triggers.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::dag_filter::root_matches;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::TaskWatchProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        })
    }
}

/// Content-relevant event kinds only; access and unknown events are
/// dropped so that reading sources never feeds back into a rebuild.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// A change that matched at least one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    /// Project-relative path with forward slashes.
    pub path: String,
    pub kind: ChangeKind,
    /// Tasks that were triggered (roots among the matches), sorted.
    pub tasks: Vec<String>,
}

impl fmt::Display for ChangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File {} was {}, running tasks...", self.path, self.kind)
    }
}

/// Match one changed path against the task profiles, print the change
/// notification and trigger the DAG-root tasks among the matches.
///
/// Returns `None` when no task is interested in the path.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    kind: ChangeKind,
    profiles: &[TaskWatchProfile],
    dep_map: &HashMap<String, Vec<String>>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> Option<ChangeNotice> {
    let Some(rel) = relative_str(root, path) else {
        warn!("could not relativize path {:?} against root {:?}", path, root);
        return None;
    };

    let matching: Vec<&str> = profiles
        .iter()
        .filter(|p| p.matches(&rel))
        .map(|p| p.name())
        .collect();
    if matching.is_empty() {
        return None;
    }

    let mut tasks: Vec<String> = root_matches(&matching, dep_map)
        .into_iter()
        .map(str::to_string)
        .collect();
    tasks.sort();

    let notice = ChangeNotice {
        path: rel,
        kind,
        tasks,
    };
    println!("{notice}");
    debug!(path = %notice.path, tasks = ?notice.tasks, "watch match; triggering root tasks");

    for task in &notice.tasks {
        let event = RuntimeEvent::TaskTriggered {
            task: task.clone(),
            reason: TriggerReason::FileWatch,
        };
        if let Err(err) = runtime_tx.send(event).await {
            warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
            break;
        }
    }

    Some(notice)
}
