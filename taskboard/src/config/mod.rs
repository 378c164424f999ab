//! Configuration system for the `taskboard` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist, or holds invalid settings, is an error.

use std::path::PathBuf;
use std::time::Duration;

use taskboard_proto::task::MAX_TASK_TEXT_LENGTH;

use crate::sync::DEFAULT_CHANNEL_CAPACITY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A setting is out of range.
    #[error("invalid setting {key}: {reason}")]
    Invalid {
        /// Dotted `section.key` name.
        key: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// What the store does with a failed API call beyond returning the error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the error in state so the UI shows an indicator.
    #[default]
    Surface,
    /// Only log the error.
    Silent,
}

/// Settings consumed by [`TaskStore`](crate::tasks::TaskStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How failures are reported.
    pub failure_policy: FailurePolicy,
    /// Maximum task text length in characters.
    pub max_text_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Surface,
            max_text_len: MAX_TASK_TEXT_LENGTH,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    cache: CacheFileConfig,
    ui: UiFileConfig,
    sync: SyncFileConfig,
}

/// `[api]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    url: Option<String>,
    timeout_secs: Option<u64>,
    offline: Option<bool>,
}

/// `[cache]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CacheFileConfig {
    dir: Option<PathBuf>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    timestamp_format: Option<String>,
    max_task_text_len: Option<usize>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    channel_capacity: Option<usize>,
    failure_policy: Option<FailurePolicy>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- API --
    /// Base URL of the task API.
    pub api_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Run against an in-process backend seeded from the cache.
    pub offline: bool,

    // -- Cache --
    /// Directory for the task snapshot. `None` uses the platform data dir.
    pub cache_dir: Option<PathBuf>,

    // -- Sync --
    /// Channel capacity for the sync worker.
    pub channel_capacity: usize,
    /// How API failures are reported.
    pub failure_policy: FailurePolicy,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Timestamp display format string (chrono).
    pub timestamp_format: String,
    /// Maximum task text length in characters.
    pub max_task_text_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            request_timeout: None,
            offline: false,
            cache_dir: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            failure_policy: FailurePolicy::Surface,
            poll_timeout: Duration::from_millis(50),
            timestamp_format: "%H:%M".to_string(),
            max_task_text_len: MAX_TASK_TEXT_LENGTH,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/taskboard/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        let config = Self::resolve(cli, &file);
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a broken file at the default path is
    /// handed to `on_fallback` and CLI args are resolved over the compiled
    /// defaults instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any problem with an explicit `--config`
    /// file.
    pub fn load_or_fallback(
        cli: &CliArgs,
        on_fallback: impl FnOnce(&ConfigError),
    ) -> Result<Self, ConfigError> {
        match Self::load(cli) {
            Ok(config) => Ok(config),
            Err(e) if cli.config.is_some() => Err(e),
            Err(e) => {
                on_fallback(&e);
                Ok(Self::from_cli(cli))
            }
        }
    }

    /// CLI args over compiled defaults, ignoring any config file.
    fn from_cli(cli: &CliArgs) -> Self {
        Self::resolve(cli, &ConfigFile::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "sync.channel_capacity",
                reason: "must be at least 1",
            });
        }
        if self.max_task_text_len == 0 {
            return Err(ConfigError::Invalid {
                key: "ui.max_task_text_len",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            api_url: cli
                .api_url
                .clone()
                .or_else(|| file.api.url.clone())
                .unwrap_or(defaults.api_url),
            request_timeout: file
                .api
                .timeout_secs
                .map(Duration::from_secs)
                .or(defaults.request_timeout),
            offline: cli.offline || file.api.offline.unwrap_or(defaults.offline),
            cache_dir: cli
                .cache_dir
                .clone()
                .or_else(|| file.cache.dir.clone()),
            channel_capacity: file
                .sync
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
            failure_policy: cli
                .failure_policy
                .or(file.sync.failure_policy)
                .unwrap_or(defaults.failure_policy),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            timestamp_format: file
                .ui
                .timestamp_format
                .clone()
                .unwrap_or(defaults.timestamp_format),
            max_task_text_len: file
                .ui
                .max_task_text_len
                .unwrap_or(defaults.max_task_text_len),
        }
    }

    /// The subset of settings the task store needs.
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig {
            failure_policy: self.failure_policy,
            max_text_len: self.max_task_text_len,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal task board synced with a remote task API")]
pub struct CliArgs {
    /// Base URL of the task API.
    #[arg(long, env = "TASKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Work offline against the cached snapshot.
    #[arg(long)]
    pub offline: bool,

    /// Directory for the local task cache.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What to do with failed API calls.
    #[arg(long, value_enum)]
    pub failure_policy: Option<FailurePolicy>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
