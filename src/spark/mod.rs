//! Command builders for the Spark command-line clients.
//!
//! - `sql` - [`SparkSqlExecutor`], a wrapper around `spark-sql` with init settings and `load_data`
//! - `submit` - [`SparkExecutor`], a wrapper around `spark-submit`
//! - `command` - shared command line assembly and [`CommandResult`]
//! - `request` - the arguments of a single `execute` call
//! - `load` - `LOAD DATA` statement formatting

pub mod command;
pub mod load;
pub mod request;
pub mod sql;
pub mod submit;

pub use command::{CommandResult, SparkClient};
pub use load::LoadData;
pub use request::ExecuteRequest;
pub use sql::{SparkSqlExecutor, SparkSqlExecutorBuilder};
pub use submit::{SparkExecutor, SparkExecutorBuilder};

use std::collections::BTreeMap;

/// Spark settings passed to a client, keyed by their dotted name.
pub type Variables = BTreeMap<String, String>;

pub const DEFAULT_SQL_CLIENT: &str = "spark-sql";
pub const DEFAULT_SUBMIT_CLIENT: &str = "spark-submit";

/// Settings that the clients accept as a dedicated option instead of `--conf`.
pub const FLAGGED_SETTINGS: &[(&str, &str)] = &[
    ("spark.app.name", "--name"),
    ("spark.driver.memory", "--driver-memory"),
    ("spark.executor.memory", "--executor-memory"),
    ("spark.executor.instances", "--num-executors"),
    ("spark.executor.cores", "--executor-cores"),
    ("spark.yarn.queue", "--queue"),
    ("spark.master", "--master"),
    ("spark.submit.deployMode", "--deploy-mode"),
];

/// The dedicated client option for `key`, if it has one.
pub fn setting_flag(key: &str) -> Option<&'static str> {
    FLAGGED_SETTINGS
        .iter()
        .find(|(setting, _)| *setting == key)
        .map(|(_, flag)| *flag)
}

fn default_variables(app_name: &str) -> Variables {
    [
        ("spark.app.name", app_name),
        ("spark.driver.memory", "4G"),
        ("spark.executor.memory", "2G"),
        ("spark.executor.instances", "20"),
        ("spark.executor.cores", "3"),
        ("spark.yarn.queue", "q_guanggao.q_adlog"),
        ("spark.master", "yarn"),
        ("spark.submit.deployMode", "client"),
        ("spark.ui.port", "4060"),
        ("spark.yarn.executor.memoryOverhead", "8192"),
        ("spark.kryoserializer.buffer.max", "128m"),
        ("spark.kryoserializer.buffer", "64k"),
        ("spark.speculation", "true"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

/// Default settings for `spark-sql`.
pub fn default_sql_variables() -> Variables {
    default_variables("sparksql_default")
}

/// Default settings for `spark-submit`.
pub fn default_submit_variables() -> Variables {
    default_variables("spark_default")
}

/// Statements run ahead of inline SQL by `spark-sql`.
pub fn default_init_settings() -> Vec<String> {
    vec![
        "set spark.sql.shuffle.partitions = 500".to_string(),
        "set spark.sql.autoBroadcastJoinThreshold = 304857600".to_string(),
    ]
}
