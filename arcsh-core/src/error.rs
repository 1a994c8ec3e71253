//! Error types for the archive shell.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading an archive or running shell commands.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Path does not resolve, or resolves to the wrong kind of node.
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Configuration file {} does not exist.", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ShellError {
    /// Whether this error is a resolution failure rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShellError::NotFound(_))
    }
}

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;
