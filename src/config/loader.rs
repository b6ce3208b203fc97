// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::info;

use crate::cli::DEFAULT_CONFIG;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::types::Preset;

/// Read and deserialize a config file without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a config file and run validation (which also expands the preset
/// when no tasks are declared).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Resolve the configuration the CLI should use.
///
/// - An existing file is loaded.
/// - A missing file at the default location falls back to an empty config,
///   i.e. the preset with default paths.
/// - A missing file anywhere else is an error.
///
/// `preset_override` replaces `[config].preset` before validation.
pub fn load_for_cli(path: &Path, preset_override: Option<Preset>) -> Result<ConfigFile> {
    let mut raw = if path.exists() {
        load_from_path(path)?
    } else if path == Path::new(DEFAULT_CONFIG) {
        info!(
            config = %path.display(),
            "no config file found; using built-in preset with default paths"
        );
        RawConfigFile::default()
    } else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file {} does not exist", path.display()),
        )
        .into());
    };

    if let Some(preset) = preset_override {
        raw.config.preset = preset;
    }

    ConfigFile::try_from(raw)
}
