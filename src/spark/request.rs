use std::path::{Path, PathBuf};

use crate::error::{Result, SparkError};

/// Arguments of one `execute` call.
///
/// Exactly one of [`sql`](Self::sql) or [`sql_file`](Self::sql_file) must be
/// set. An output file can only capture inline SQL; a log file works with both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub init_sql_file: Option<PathBuf>,
    pub sql_file: Option<PathBuf>,
    pub sql: Option<String>,
    pub output_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub print_stderr: bool,
}

impl ExecuteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that runs inline SQL.
    pub fn sql(sql: impl Into<String>) -> Self {
        Self {
            sql: Some(sql.into()),
            ..Self::default()
        }
    }

    /// Request that runs a SQL file.
    pub fn sql_file(path: impl Into<PathBuf>) -> Self {
        Self {
            sql_file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_init_sql_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.init_sql_file = Some(path.into());
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_print_stderr(mut self, print: bool) -> Self {
        self.print_stderr = print;
        self
    }

    /// Check argument combinations and that referenced input files exist.
    pub fn validate(&self) -> Result<()> {
        match (&self.sql, &self.sql_file) {
            (None, None) => {
                return Err(SparkError::MissingArgument(
                    "one of sql or sql_file is required".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(SparkError::InvalidArgument(
                    "sql and sql_file are mutually exclusive".to_string(),
                ))
            }
            _ => {}
        }

        if let Some(init) = &self.init_sql_file {
            ensure_exists(init)?;
        }

        if let Some(file) = &self.sql_file {
            ensure_exists(file)?;
        }

        if self.output_file.is_some() && self.sql.is_none() {
            return Err(SparkError::InvalidArgument(
                "output_file can only be used together with sql".to_string(),
            ));
        }

        Ok(())
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SparkError::FileNotFound(path.to_path_buf()))
    }
}
