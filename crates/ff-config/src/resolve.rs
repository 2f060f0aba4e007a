//! Config file resolution.
//!
//! Resolution order, first hit wins:
//! 1. explicit path from the CLI (`--config`)
//! 2. `FITFRAME_CONFIG` environment variable
//! 3. `<config dir>/fitframe/config.json`
//! 4. built-in defaults
//!
//! Explicit paths (1 and 2) must exist. The XDG location is optional.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::frame::FrameConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "FITFRAME_CONFIG";

const CONFIG_DIR_NAME: &str = "fitframe";
const CONFIG_FILE_NAME: &str = "config.json";

/// Errors from config resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Cli(PathBuf),
    Env(PathBuf),
    UserDir(PathBuf),
    Defaults,
}

/// A loaded configuration with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub config: FrameConfig,
    pub source: ConfigSource,
}

impl ResolvedConfig {
    pub fn using_defaults(&self) -> bool {
        self.source == ConfigSource::Defaults
    }
}

/// Resolve configuration from the CLI path, the environment, and the user
/// config directory.
pub fn resolve_config(cli_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let env_path = std::env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let user_path = default_config_path();
    resolve_from(cli_path, env_path, user_path)
}

/// Default per-user config file location, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn resolve_from(
    cli_path: Option<&Path>,
    env_path: Option<PathBuf>,
    user_path: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = cli_path {
        let config = load_required(path)?;
        return Ok(ResolvedConfig {
            config,
            source: ConfigSource::Cli(path.to_path_buf()),
        });
    }

    if let Some(path) = env_path {
        let config = load_required(&path)?;
        return Ok(ResolvedConfig {
            config,
            source: ConfigSource::Env(path),
        });
    }

    if let Some(path) = user_path {
        if path.is_file() {
            let config = load_file(&path)?;
            return Ok(ResolvedConfig {
                config,
                source: ConfigSource::UserDir(path),
            });
        }
        debug!(path = %path.display(), "no user config file, using defaults");
    }

    Ok(ResolvedConfig {
        config: FrameConfig::default(),
        source: ConfigSource::Defaults,
    })
}

fn load_required(path: &Path) -> Result<FrameConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_file(path)
}

fn load_file(path: &Path) -> Result<FrameConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = FrameConfig::from_json(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}
