// src/watch/watcher.rs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TaskName};
use crate::watch::event_handler::{change_kind, process_file_change};
use crate::watch::patterns::TaskWatchProfile;

/// Dropping the handle stops the notify backend; the dispatcher task then
/// drains and exits.
pub struct WatcherHandle {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl WatcherHandle {
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// What the dispatcher needs to turn a raw path into task triggers.
struct Dispatch {
    root: PathBuf,
    profiles: Vec<TaskWatchProfile>,
    deps: HashMap<TaskName, Vec<TaskName>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl Dispatch {
    async fn handle(&self, event: Event) {
        let Some(kind) = change_kind(&event.kind) else {
            return;
        };
        for path in &event.paths {
            process_file_change(
                &self.root,
                path,
                kind,
                &self.profiles,
                &self.deps,
                &self.runtime_tx,
            )
            .await;
        }
    }
}

/// Watch `root` recursively and send `TaskTriggered` for the DAG roots
/// among the tasks whose patterns match a changed path.
///
/// notify calls back on its own thread; events cross an unbounded channel
/// into one async dispatcher so notices are printed in arrival order.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root: PathBuf = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<Event>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            // Receiver gone means the dispatcher shut down; nothing to do.
            let _ = raw_tx.send(event);
        }
        Err(err) => warn!(error = %err, "file watch error"),
    })
    .context("creating file watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {}", root.display()))?;

    info!(root = %root.display(), tasks = profiles.len(), "file watcher started");

    let dispatch = Dispatch {
        root: root.clone(),
        deps: profiles
            .iter()
            .map(|p| (p.name().to_string(), p.deps().to_vec()))
            .collect(),
        profiles,
        runtime_tx,
    };

    tokio::spawn(async move {
        while let Some(event) = raw_rx.recv().await {
            debug!(?event, "notify event");
            dispatch.handle(event).await;
        }
        debug!("watch dispatcher finished");
    });

    Ok(WatcherHandle {
        root,
        _watcher: watcher,
    })
}
