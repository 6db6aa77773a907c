use std::path::PathBuf;
use thiserror::Error;

use crate::subprocess::ProcessError;

/// Errors raised while building or running Spark client commands.
#[derive(Error, Debug)]
pub enum SparkError {
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("spark-sql client not found: {0}")]
    SparkSqlUnfound(String),

    #[error("spark client not found: {0}")]
    SparkUnfound(String),

    #[error("spark-sql command failed: {command}\n{stderr}")]
    SparkSqlCommandExecute { command: String, stderr: String },

    #[error("spark command failed: {command}\n{stderr}")]
    SparkCommandExecute { command: String, stderr: String },

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),
}

impl SparkError {
    pub fn is_client_not_found(&self) -> bool {
        matches!(
            self,
            SparkError::SparkSqlUnfound(_) | SparkError::SparkUnfound(_)
        )
    }

    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            SparkError::SparkSqlCommandExecute { .. } | SparkError::SparkCommandExecute { .. }
        )
    }

    /// Captured stderr of a failed command, if this error carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            SparkError::SparkSqlCommandExecute { stderr, .. }
            | SparkError::SparkCommandExecute { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SparkError>;
