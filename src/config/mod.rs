use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::spark::{
    default_init_settings, default_sql_variables, default_submit_variables, SparkExecutor,
    SparkSqlExecutor, Variables, DEFAULT_SQL_CLIENT, DEFAULT_SUBMIT_CLIENT,
};
use crate::subprocess::ProcessRunner;

pub mod loader;


pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};

/// Settings for both Spark clients, usually read from `spark-executor.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExecutorConfig {
    pub sql: SqlConfig,
    pub submit: SubmitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqlConfig {
    pub client: String,
    pub verbose: bool,
    pub init_settings: Vec<String>,
    pub variables: Variables,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubmitConfig {
    pub client: String,
    pub verbose: bool,
    pub variables: Variables,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            client: DEFAULT_SQL_CLIENT.to_string(),
            verbose: false,
            init_settings: default_init_settings(),
            variables: default_sql_variables(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            client: DEFAULT_SUBMIT_CLIENT.to_string(),
            verbose: false,
            variables: default_submit_variables(),
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `SPARK_EXECUTOR_*` overrides read through `lookup`.
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client) = lookup("SPARK_EXECUTOR_SQL_CLIENT") {
            self.sql.client = client;
        }

        if let Some(client) = lookup("SPARK_EXECUTOR_SUBMIT_CLIENT") {
            self.submit.client = client;
        }

        if let Some(queue) = lookup("SPARK_EXECUTOR_QUEUE") {
            self.sql
                .variables
                .insert("spark.yarn.queue".to_string(), queue.clone());
            self.submit
                .variables
                .insert("spark.yarn.queue".to_string(), queue);
        }

        if let Some(verbose) = lookup("SPARK_EXECUTOR_VERBOSE") {
            if let Ok(value) = verbose.parse::<bool>() {
                self.sql.verbose = value;
                self.submit.verbose = value;
            } else {
                tracing::warn!("Ignoring SPARK_EXECUTOR_VERBOSE={}: not a bool", verbose);
            }
        }
    }

    pub fn sql_executor(&self, runner: Arc<dyn ProcessRunner>) -> Result<SparkSqlExecutor> {
        SparkSqlExecutor::builder(self.sql.client.clone())
            .variables(self.sql.variables.clone())
            .init_settings(self.sql.init_settings.clone())
            .verbose(self.sql.verbose)
            .runner(runner)
            .build()
    }

    pub fn submit_executor(&self, runner: Arc<dyn ProcessRunner>) -> Result<SparkExecutor> {
        SparkExecutor::builder(self.submit.client.clone())
            .variables(self.submit.variables.clone())
            .verbose(self.submit.verbose)
            .runner(runner)
            .build()
    }
}
