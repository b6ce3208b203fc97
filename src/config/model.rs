// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{Preset, Step, TriggerWhileRunningBehaviour};

/// Configuration exactly as read from TOML, before presets are expanded and
/// before validation.
///
/// ```toml
/// [config]
/// preset = "extended"
///
/// [paths]
/// src = "src"
/// out = "out"
///
/// [fingerprint]
/// extensions = ["js", "css"]
///
/// [serve]
/// addr = "127.0.0.1:7878"
///
/// [task.build]
/// steps = ["copy", "fingerprint", "rewrite"]
/// after = ["clean"]
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub fingerprint: FingerprintSection,

    #[serde(default)]
    pub serve: ServeSection,

    /// Defaults for `watch` / `exclude` from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All tasks from `[task.<name>]`. Empty means "use the preset".
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub paths: PathsSection,
    pub fingerprint: FingerprintSection,
    pub serve: ServeSection,
    pub default: DefaultSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            paths: raw.paths,
            fingerprint: raw.fingerprint,
            serve: raw.serve,
            default: raw.default,
            task: raw.task,
        }
    }

    pub fn default_section(&self) -> &DefaultSection {
        &self.default
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// `"queue"` (default) or `"cancel"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued rebuild runs to remember.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Task table used when no `[task.<name>]` is declared.
    #[serde(default)]
    pub preset: Preset,
}

fn default_queue_length() -> usize {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: default_queue_length(),
            preset: Preset::default(),
        }
    }
}

/// `[paths]` section. Relative paths are resolved against the project root
/// (the directory holding the config file).
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_src")]
    pub src: PathBuf,

    #[serde(default = "default_out")]
    pub out: PathBuf,

    /// Globs, relative to `src`, selecting the files to copy.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Globs, relative to `src`, removed from the copy set.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_out() -> PathBuf {
    PathBuf::from("out")
}

fn default_include() -> Vec<String> {
    vec!["**".to_string()]
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            out: default_out(),
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

/// `[fingerprint]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintSection {
    /// Extensions (without the dot) whose files get a content token.
    #[serde(default = "default_fingerprint_extensions")]
    pub extensions: Vec<String>,

    /// Number of hex characters of the content hash kept in the filename.
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// Extensions of the files scanned for references to renamed assets.
    #[serde(default = "default_rewrite_extensions")]
    pub rewrite_extensions: Vec<String>,
}

fn default_fingerprint_extensions() -> Vec<String> {
    vec!["js".to_string(), "css".to_string()]
}

fn default_token_length() -> usize {
    10
}

fn default_rewrite_extensions() -> Vec<String> {
    ["html", "htm", "css", "js", "hbs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for FingerprintSection {
    fn default() -> Self {
        Self {
            extensions: default_fingerprint_extensions(),
            token_length: default_token_length(),
            rewrite_extensions: default_rewrite_extensions(),
        }
    }
}

/// `[serve]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Socket address the static server binds to.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// URL prefix under which the output directory is exposed.
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_addr() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_base_path() -> String {
    "/".to_string()
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            base_path: default_base_path(),
        }
    }
}

/// `[default]` section.
///
/// ```toml
/// [default]
/// watch = ["src/**"]
/// exclude = ["src/**/*.swp"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Watch patterns for tasks that do not declare their own.
    #[serde(default)]
    pub watch: Vec<String>,

    /// Exclude patterns for tasks that do not declare their own.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Steps executed in order when the task runs. May be empty (an
    /// aggregate task such as `default`).
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Project-relative globs that re-trigger this task in watch mode.
    ///
    /// If `None`, the task uses `default.watch`.
    #[serde(default)]
    pub watch: Option<Vec<String>>,

    /// If `None`, the task uses `default.exclude`.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// If true, `default.watch` is appended to `task.watch`.
    #[serde(default)]
    pub append_default_watch: bool,

    /// If true, `default.exclude` is appended to `task.exclude`.
    #[serde(default)]
    pub append_default_exclude: bool,
}

impl TaskConfig {
    /// Whether any step of this task keeps running after it has reported
    /// progress (currently only `serve`).
    pub fn is_long_lived(&self) -> bool {
        self.steps.iter().any(|s| s.is_long_lived())
    }
}
