// src/engine/queue.rs

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use crate::engine::TaskName;
use crate::types::TriggerWhileRunningBehaviour;

/// Triggers that arrive while a DAG run is executing.
///
/// Each entry is a batch of task names to trigger together as one future
/// run. A batch stays open until a trigger repeats one of its tasks; that
/// trigger opens the next batch, up to `max_runs` batches. Once the queue
/// is full, further triggers fold into the newest batch, so nothing is
/// dropped and a burst of saves costs at most `max_runs` follow-up runs.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<BTreeSet<TaskName>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        Self {
            behaviour,
            max_runs: max_runs.max(1),
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.behaviour
    }

    /// Record a trigger that arrived mid-run.
    ///
    /// - `Queue`: add to the newest batch, or open a new batch when the
    ///   newest one already holds `task` and there is room.
    /// - `Cancel`: replace every queued batch with one holding only `task`.
    pub fn record_trigger(&mut self, task: &str) {
        let name = task.to_string();

        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                let has_room = self.runs.len() < self.max_runs;
                match self.runs.back_mut() {
                    Some(last) if !last.contains(&name) || !has_room => {
                        let inserted = last.insert(name.clone());
                        debug!(task = %name, inserted, "merged trigger into newest batch");
                    }
                    _ => {
                        self.runs.push_back(BTreeSet::from([name.clone()]));
                        debug!(task = %name, batches = self.runs.len(), "opened queued batch");
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(task = %name, "replacing queued batches with latest trigger");
                self.runs.clear();
                self.runs.push_back(BTreeSet::from([name]));
            }
        }
    }

    /// Take the oldest queued batch as a sorted list of task names.
    pub fn next_batch(&mut self) -> Vec<TaskName> {
        let batch = self.runs.pop_front().unwrap_or_default();
        debug!(
            tasks = batch.len(),
            remaining = self.runs.len(),
            "took queued batch for new run"
        );
        batch.into_iter().collect()
    }
}
