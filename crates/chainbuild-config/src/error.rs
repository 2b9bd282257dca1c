//! Configuration parsing errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("config file {0} must contain a mapping")]
    NotAMapping(PathBuf),

    #[error("unsupported config extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for chainbuild_core::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => chainbuild_core::Error::Io(io),
            other => chainbuild_core::Error::Configuration(other.to_string()),
        }
    }
}
