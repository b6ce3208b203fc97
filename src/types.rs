use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Behaviour when a new trigger arrives while a DAG run is already in progress.
///
/// - `Queue`: remember the trigger and start a new run once the current one
///   finishes (default).
/// - `Cancel`: drop whatever was queued and keep only the latest trigger.
///   The active run is never interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}

impl FromStr for TriggerWhileRunningBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileRunningBehaviour::Queue),
            "cancel" => Ok(TriggerWhileRunningBehaviour::Cancel),
            other => Err(format!(
                "invalid triggered_while_running_behaviour: {other} (expected \"queue\" or \"cancel\")"
            )),
        }
    }
}

/// Built-in task tables used when a config declares no `[task.<name>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// `clean` -> `build` (plain copy) -> `default`.
    #[default]
    Minimal,
    /// `clean` -> `build` (copy, fingerprint, rewrite) -> `apimocker`
    /// (serve + watch) -> `default`.
    Extended,
}

/// One unit of work inside a task.
///
/// Steps of a task run in the order they are declared. `serve` never
/// finishes on its own and therefore has to be the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Clean,
    Copy,
    Fingerprint,
    Rewrite,
    Serve,
}

impl Step {
    pub fn is_long_lived(self) -> bool {
        matches!(self, Step::Serve)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Clean => "clean",
            Step::Copy => "copy",
            Step::Fingerprint => "fingerprint",
            Step::Rewrite => "rewrite",
            Step::Serve => "serve",
        };
        f.write_str(s)
    }
}
