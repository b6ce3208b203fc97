// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::Preset;

/// Command-line arguments for `assetdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetdag",
    version,
    about = "Copy, fingerprint and serve static assets through a task DAG.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run, together with everything it depends on.
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Path to the config file (TOML).
    ///
    /// When the default `Assetdag.toml` does not exist, the built-in preset
    /// is used with `src/` and `out/` relative to the working directory.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Built-in task table to use when the config declares no tasks.
    #[arg(long, value_enum, value_name = "PRESET")]
    pub preset: Option<Preset>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the available task names and exit.
    #[arg(long)]
    pub list: bool,
}

pub const DEFAULT_CONFIG: &str = "Assetdag.toml";

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
