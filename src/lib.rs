//! # spark-executor
//!
//! Compose and run `spark-sql` and `spark-submit` invocations from plain settings maps.
//!
//! ## Usage
//!
//! ```bash
//! spark-executor sql -e "select count(*) from db.events"
//! spark-executor load --path /data/in --database db --table events --partition dt=20160501
//! ```
//!
//! ## Modules
//!
//! - `spark` - Command builders for the SQL shell and the submit client
//! - `subprocess` - Process runner abstraction with a tokio implementation and a mock
//! - `config` - TOML configuration with environment overrides
//! - `error` - Error type shared by the builders
pub mod config;
pub mod error;
pub mod spark;
pub mod subprocess;

pub use error::{Result, SparkError};
pub use spark::{CommandResult, ExecuteRequest, LoadData, SparkExecutor, SparkSqlExecutor};
