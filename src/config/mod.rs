// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`]: the TOML-backed data model.
//! - [`loader`]: reading config files from disk.
//! - [`preset`]: the built-in `minimal` / `extended` task tables.
//! - [`validate`]: DAG correctness and global sanity checks.

pub mod loader;
pub mod model;
pub mod preset;
pub mod validate;

pub use loader::{load_and_validate, load_for_cli, load_from_path};
pub use model::{
    ConfigFile, ConfigSection, DefaultSection, FingerprintSection, PathsSection, RawConfigFile,
    ServeSection, TaskConfig,
};
pub use preset::preset_tasks;
