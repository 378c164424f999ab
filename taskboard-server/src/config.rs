//! Server settings: `--flags` and env vars over a `[server]` TOML table over
//! defaults.
//!
//! The table is read from `--config`, or from
//! `~/.config/taskboard-server/config.toml` when that exists:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//! seed = "tasks.json"   # relative to this file
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// `bind` is not an `ip:port` pair.
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileTable {
    server: ServerTable,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerTable {
    bind: Option<String>,
    seed: Option<PathBuf>,
}

/// A config file as read from disk, with the directory it came from.
#[derive(Debug, Default)]
struct LoadedFile {
    table: FileTable,
    dir: Option<PathBuf>,
}

#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "taskboard development task API")]
pub struct ServerCliArgs {
    /// Socket address to listen on.
    #[arg(short, long, env = "TASKBOARD_ADDR")]
    pub bind: Option<String>,

    /// Config file (default: `~/.config/taskboard-server/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON array of tasks to preload.
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_SERVER_LOG")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Snapshot preloaded into the repository at startup.
    pub seed: Option<PathBuf>,
    pub log_level: String,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit `--config` file is missing, any
    /// config file fails to parse, or the bind address is malformed.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_file(path)?,
            None => match dirs::config_dir() {
                Some(dir) => read_optional_file(&dir.join("taskboard-server").join("config.toml"))?,
                None => LoadedFile::default(),
            },
        };
        Self::resolve(cli, &file)
    }

    fn resolve(cli: &ServerCliArgs, file: &LoadedFile) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .as_deref()
            .or(file.table.server.bind.as_deref())
            .unwrap_or(DEFAULT_BIND);
        let bind_addr = bind.parse().map_err(|source| ConfigError::BindAddr {
            value: bind.to_string(),
            source,
        })?;

        // File seeds are relative to the file, CLI seeds to the working dir.
        let seed = cli.seed.clone().or_else(|| {
            let seed = file.table.server.seed.as_ref()?;
            Some(match &file.dir {
                Some(dir) if seed.is_relative() => dir.join(seed),
                _ => seed.clone(),
            })
        });

        Ok(Self {
            bind_addr,
            seed,
            log_level: cli.log_level.clone(),
        })
    }
}

fn read_file(path: &Path) -> Result<LoadedFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedFile {
        table: toml::from_str(&contents)?,
        dir: path.parent().map(Path::to_path_buf),
    })
}

fn read_optional_file(path: &Path) -> Result<LoadedFile, ConfigError> {
    match read_file(path) {
        Err(ConfigError::ReadFile { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(LoadedFile::default())
        }
        other => other,
    }
}
