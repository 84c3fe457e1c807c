use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::store::IdStrategy;

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// Which album store backend to run
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Collection held in process memory, lost on restart
  Memory,
  /// Collection persisted in a single JSON document
  #[default]
  File,
}

impl std::str::FromStr for Backend {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "memory" => Ok(Backend::Memory),
      "file" => Ok(Backend::File),
      other => Err(format!("unknown backend '{}'", other)),
    }
  }
}

/// Album store configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend: Backend,

  /// Backing document for the file backend
  #[serde(default = "default_store_path")]
  pub path: PathBuf,

  #[serde(default)]
  pub id_strategy: IdStrategy,

  /// Start from the sample albums instead of an empty collection
  #[serde(default = "default_seed")]
  pub seed: bool,
}

fn default_store_path() -> PathBuf {
  PathBuf::from("albums.json")
}

fn default_seed() -> bool {
  true
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend: Backend::default(),
      path: default_store_path(),
      id_strategy: IdStrategy::default(),
      seed: default_seed(),
    }
  }
}

/// albumdb configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
  /// HTTP listening address
  #[serde(default = "default_server_addr")]
  pub server_addr: String,

  /// Album store configuration
  #[serde(default)]
  pub store: StoreConfig,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

fn default_server_addr() -> String {
  "localhost:8080".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: default_server_addr(),
      store: StoreConfig::default(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_string(),
      source,
    })?;

    toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
      path: path.to_string(),
      source,
    })
  }
}
