// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`executor_loop`] owns the background loop and the running server.
//! - [`task_runner`] runs one task's build pass and serve step.
//! - [`backend`] provides the `ExecutorBackend` trait the runtime talks to,
//!   and the production `PipelineExecutor`.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, PipelineExecutor};
pub use executor_loop::spawn_executor;
