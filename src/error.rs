use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a patch run
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write template {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("container {0} does not exist")]
    ContainerNotFound(String),

    #[error("container engine error for {container}: {message}")]
    Engine { container: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PatchError>;
