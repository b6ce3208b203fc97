// src/engine/ledger.rs

use std::collections::BTreeSet;

use crate::engine::{RuntimeOptions, TaskName};

/// Failures collected while a run is active, plus how many runs ended.
#[derive(Debug, Default)]
pub struct RunLedger {
    failed: BTreeSet<TaskName>,
    finished_runs: u64,
}

/// How a run ended, as far as the runtime is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunVerdict {
    Clean,
    /// Failures that are only logged (watch mode after the first run).
    Tolerated(Vec<TaskName>),
    Fatal(Vec<TaskName>),
}

impl RunLedger {
    pub fn finished_runs(&self) -> u64 {
        self.finished_runs
    }

    pub fn record_failures<'a>(&mut self, tasks: impl IntoIterator<Item = &'a TaskName>) {
        self.failed.extend(tasks.into_iter().cloned());
    }

    /// Close the active run. Failures in the first run are always fatal.
    pub fn close_run(&mut self, options: &RuntimeOptions) -> RunVerdict {
        let failed: Vec<TaskName> = std::mem::take(&mut self.failed).into_iter().collect();
        let first = self.finished_runs == 0;
        self.finished_runs += 1;

        if failed.is_empty() {
            RunVerdict::Clean
        } else if first || !options.tolerate_failures_after_first_run {
            RunVerdict::Fatal(failed)
        } else {
            RunVerdict::Tolerated(failed)
        }
    }
}
