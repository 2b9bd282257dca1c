//! Error types for chainbuild.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{found:?} is not supported by {step}: supported project types are {supported:?}")]
    ProjectTypeNotSupported {
        step: String,
        found: String,
        supported: Vec<String>,
    },

    #[error("build error: {0}")]
    Build(String),

    #[error("copy failed: {0}")]
    Copy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
