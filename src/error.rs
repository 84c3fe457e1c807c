use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by an album store while loading or persisting the collection
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read backing document '{}': {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write backing document '{}': {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("backing document '{}' is not a valid album array: {source}", .path.display())]
  Decode {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to encode album collection: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("album store lock poisoned")]
  LockPoisoned,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors raised while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{path}': {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file '{path}': {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },
}
