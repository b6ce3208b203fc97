use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use assetdag::dag::ScheduledTask;
use assetdag::engine::{RuntimeEvent, TaskOutcome};
use assetdag::errors::Result;
use assetdag::exec::ExecutorBackend;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which tasks were "run"
/// - reports `TaskProgressed` for long-lived (serving) tasks
/// - reports `TaskCompleted` for everything else, failing the tasks listed
///   in `failing`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Share a set of task names that should fail; tests may change it
    /// while the runtime is running.
    pub fn with_failing(mut self, failing: Arc<Mutex<HashSet<String>>>) -> Self {
        self.failing = failing;
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failing = Arc::clone(&self.failing);

        Box::pin(async move {
            for t in tasks {
                executed.lock().unwrap().push(t.name.clone());

                let event = if t.long_lived {
                    RuntimeEvent::TaskProgressed {
                        task: t.name.clone(),
                    }
                } else if failing.lock().unwrap().contains(&t.name) {
                    RuntimeEvent::TaskCompleted {
                        task: t.name.clone(),
                        outcome: TaskOutcome::Failed(format!("{} failed on purpose", t.name)),
                    }
                } else {
                    RuntimeEvent::TaskCompleted {
                        task: t.name.clone(),
                        outcome: TaskOutcome::Success,
                    }
                };

                tx.send(event).await.map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
