// src/engine/core.rs

//! Pure core state machine.
//!
//! Consumes [`RuntimeEvent`]s and answers with the [`CoreCommand`]s the
//! async shell (`engine::runtime::Runtime`) should carry out. No channels,
//! no Tokio, no filesystem: tests drive it one event at a time.

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use crate::dag::{Scheduler, SchedulerStep, TaskRunState};
use crate::engine::command::{CoreCommand, CoreStep};
use crate::engine::ledger::{RunLedger, RunVerdict};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName, TaskOutcome, TriggerReason};
use crate::types::TriggerWhileRunningBehaviour;

#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    ledger: RunLedger,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(
        scheduler: Scheduler,
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            scheduler,
            queue: TriggerQueue::new(behaviour, queue_length),
            ledger: RunLedger::default(),
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn finished_runs(&self) -> u64 {
        self.ledger.finished_runs()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => self.on_trigger(task, reason),
            RuntimeEvent::TaskProgressed { task } => {
                let step = self.scheduler.step_progress(&task);
                self.settle(step)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => {
                if let TaskOutcome::Failed(reason) = &outcome {
                    debug!(task = %task, %reason, "task reported failure");
                }
                let step = self.scheduler.step_completion(&task, outcome);
                self.settle(step)
            }
            RuntimeEvent::ShutdownRequested => {
                info!("shutdown requested");
                CoreStep::stop(Vec::new())
            }
        }
    }

    /// Idle: start a run from this trigger plus the oldest queued batch.
    /// Mid-run: pull the task into the active run if it is not part of it
    /// yet, otherwise park it in the queue.
    fn on_trigger(&mut self, task: TaskName, reason: TriggerReason) -> CoreStep {
        if self.scheduler.is_idle() {
            let mut seeds: BTreeSet<TaskName> = self.queue.next_batch().into_iter().collect();
            seeds.insert(task);
            return CoreStep::proceed(self.start_run(seeds));
        }

        let mut commands = Vec::new();
        match self.scheduler.run_state_of(&task) {
            None => warn!(task = %task, ?reason, "trigger for unknown task; ignoring"),
            Some(TaskRunState::NotInRun) => {
                let ready = self.scheduler.handle_trigger(&task);
                CoreStep::dispatch_into(&mut commands, ready);
            }
            Some(_) => {
                info!(task = %task, ?reason, "run in progress; queueing rebuild");
                self.queue.record_trigger(&task);
            }
        }
        CoreStep::proceed(commands)
    }

    /// Dispatch newly ready tasks, close a finished run, then either start
    /// a queued run or (one-shot) ask to exit.
    fn settle(&mut self, step: SchedulerStep) -> CoreStep {
        self.ledger.record_failures(&step.newly_failed);

        let mut commands = Vec::new();
        CoreStep::dispatch_into(&mut commands, step.newly_scheduled);

        if step.run_just_finished {
            match self.ledger.close_run(&self.options) {
                RunVerdict::Clean => info!("run finished"),
                RunVerdict::Tolerated(failed) => {
                    warn!(?failed, "rebuild failed; waiting for the next change");
                }
                RunVerdict::Fatal(failed) => {
                    error!(?failed, "run failed; stopping");
                    return CoreStep::stop(vec![CoreCommand::AbortRun(failed)]);
                }
            }
        }

        if self.scheduler.is_idle() && !self.queue.is_empty() {
            let seeds: BTreeSet<TaskName> = self.queue.next_batch().into_iter().collect();
            commands.extend(self.start_run(seeds));
        }

        if self.options.exit_when_idle && self.scheduler.is_idle() && self.queue.is_empty() {
            commands.push(CoreCommand::RequestExit);
            return CoreStep::stop(commands);
        }

        CoreStep::proceed(commands)
    }

    fn start_run(&mut self, seeds: BTreeSet<TaskName>) -> Vec<CoreCommand> {
        if seeds.is_empty() {
            return Vec::new();
        }

        self.scheduler.start_new_run();
        let ready = seeds
            .iter()
            .flat_map(|task| self.scheduler.handle_trigger(task))
            .collect();

        let mut commands = Vec::new();
        CoreStep::dispatch_into(&mut commands, ready);
        commands
    }
}
