// src/watch/mod.rs

//! File watching.
//!
//! Compiles per-task `watch` / `exclude` globs, runs a recursive `notify`
//! watcher and turns matching changes into task triggers. It knows the
//! dependency lists only to trigger the roots among the matched tasks.

pub mod dag_filter;
pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event_handler::{change_kind, process_file_change, ChangeKind, ChangeNotice};
pub use patterns::{
    build_globset, build_profiles_from_config, build_task_watch_profiles, RawTaskPatternSpec,
    TaskWatchProfile, WatchDefaults,
};
pub use watcher::{spawn_watcher, WatcherHandle};
