use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::{
    default_init_settings, default_sql_variables, CommandResult, ExecuteRequest, LoadData,
    SparkClient, Variables, DEFAULT_SQL_CLIENT,
};
use crate::error::{Result, SparkError};
use crate::subprocess::{ProcessRunner, TokioProcessRunner};

/// Lines `spark-sql` prints besides query results.
static CLIENT_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(SET |.*spark)").expect("client noise pattern is valid"));

/// Wrapper around the `spark-sql` client.
///
/// Inline SQL is run after the configured init settings, so session level
/// tuning applies to every statement:
///
/// ```no_run
/// # use spark_executor::spark::{ExecuteRequest, SparkSqlExecutor};
/// # async fn demo() -> spark_executor::error::Result<()> {
/// let executor = SparkSqlExecutor::builder("spark-sql")
///     .init_settings(vec!["set spark.sql.shuffle.partitions = 200".to_string()])
///     .variable("spark.executor.memory", "8G")
///     .build()?;
///
/// let result = executor.execute(&ExecuteRequest::sql("show databases")).await?;
/// for row in SparkSqlExecutor::result_rows(result.stdout()) {
///     println!("{row}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SparkSqlExecutor {
    client: SparkClient,
    init_settings: Vec<String>,
}

impl SparkSqlExecutor {
    pub fn builder(client: impl Into<String>) -> SparkSqlExecutorBuilder {
        SparkSqlExecutorBuilder::new(client)
    }

    /// Executor for `client` with the default settings.
    pub fn new(client: impl Into<String>) -> Result<Self> {
        Self::builder(client).build()
    }

    pub fn client(&self) -> &SparkClient {
        &self.client
    }

    pub fn init_settings(&self) -> &[String] {
        &self.init_settings
    }

    /// The command line `execute` would run for `request`.
    pub fn command_line(&self, request: &ExecuteRequest) -> Result<String> {
        self.client.render(request, &self.init_settings)
    }

    pub async fn execute(&self, request: &ExecuteRequest) -> Result<CommandResult> {
        let line = self.command_line(request)?;
        self.client.run(&line, request.print_stderr).await
    }

    /// Run a `LOAD DATA` statement. A non-zero exit becomes an error carrying stderr.
    pub async fn load_data(&self, load: &LoadData) -> Result<bool> {
        load.validate()?;

        let statement = load.to_string();
        tracing::debug!("Load statement: {}", statement);

        let result = self.execute(&ExecuteRequest::sql(statement.clone())).await?;
        if result.success() {
            return Ok(true);
        }

        tracing::error!(
            "Load into {}.{} failed with status {}: {}",
            load.database,
            load.table,
            result.status(),
            result.stderr()
        );
        Err(SparkError::SparkSqlCommandExecute {
            command: statement,
            stderr: result.stderr().to_string(),
        })
    }

    /// Split captured stdout into result rows, dropping blank lines and client chatter.
    pub fn result_rows(text: &str) -> Vec<String> {
        text.trim()
            .lines()
            .filter(|line| !line.is_empty() && !CLIENT_NOISE.is_match(line))
            .map(str::to_string)
            .collect()
    }
}

pub struct SparkSqlExecutorBuilder {
    client: String,
    variables: Variables,
    init_settings: Vec<String>,
    verbose: bool,
    runner: Option<Arc<dyn ProcessRunner>>,
}

impl SparkSqlExecutorBuilder {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            variables: default_sql_variables(),
            init_settings: default_init_settings(),
            verbose: false,
            runner: None,
        }
    }

    /// Replace the default settings.
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Set a single setting on top of the current ones.
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Replace the default init settings. An empty list disables the prefix.
    pub fn init_settings(mut self, init_settings: Vec<String>) -> Self {
        self.init_settings = init_settings;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn build(self) -> Result<SparkSqlExecutor> {
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(TokioProcessRunner) as Arc<dyn ProcessRunner>);
        let client = SparkClient::resolve(
            self.client,
            self.variables,
            self.verbose,
            runner,
            SparkError::SparkSqlUnfound,
        )?;

        Ok(SparkSqlExecutor {
            client,
            init_settings: self.init_settings,
        })
    }
}

impl Default for SparkSqlExecutorBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SQL_CLIENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::{MockProcessRunner, SubprocessManager};

    // `sh` stands in for spark-sql: it always resolves on the search path.
    fn executor(mock_setup: impl FnOnce(&mut MockProcessRunner)) -> (SparkSqlExecutor, MockProcessRunner) {
        let (manager, mut mock) = SubprocessManager::mock();
        mock_setup(&mut mock);
        let executor = SparkSqlExecutor::builder("sh")
            .runner(manager.runner())
            .build()
            .unwrap();
        (executor, mock)
    }

    #[test]
    fn test_empty_client_is_missing_argument() {
        let err = SparkSqlExecutor::new("").unwrap_err();
        assert!(matches!(err, SparkError::MissingArgument(_)));
    }

    #[test]
    fn test_unresolvable_client() {
        let err = SparkSqlExecutor::new("spark-sql-not-installed-12345").unwrap_err();
        assert!(matches!(err, SparkError::SparkSqlUnfound(_)));
        assert!(err.is_client_not_found());
    }

    #[test]
    fn test_defaults_applied() {
        let (executor, _) = executor(|_| {});
        assert_eq!(executor.init_settings(), default_init_settings().as_slice());
        assert_eq!(executor.client().variables(), &default_sql_variables());
        assert!(!executor.client().verbose());

        let line = executor
            .command_line(&ExecuteRequest::sql("select 1"))
            .unwrap();
        assert!(line.contains("--name sparksql_default"));
        assert!(line.contains("--num-executors 20"));
        assert!(line.contains("--conf spark.ui.port=4060"));
        assert!(line.ends_with(
            "-e \"set spark.sql.shuffle.partitions = 500;set spark.sql.autoBroadcastJoinThreshold = 304857600;select 1\""
        ));
    }

    #[test]
    fn test_empty_init_settings_disable_prefix() {
        let (manager, _mock) = SubprocessManager::mock();
        let executor = SparkSqlExecutor::builder("sh")
            .variables(Variables::new())
            .init_settings(Vec::new())
            .verbose(true)
            .runner(manager.runner())
            .build()
            .unwrap();

        let line = executor
            .command_line(&ExecuteRequest::sql("select 1"))
            .unwrap();
        assert_eq!(line, "sh -v -e \"select 1\"");
    }

    #[tokio::test]
    async fn test_execute_returns_result_unchanged() {
        let (executor, mock) = executor(|mock| {
            mock.expect_shell(|line| line.contains("-e \"") && line.contains("show tables"))
                .returns_stdout("default\tevents\tfalse\n")
                .returns_stderr("Time taken: 0.1 seconds\n")
                .returns_exit_code(0)
                .finish();
        });

        let result = executor
            .execute(&ExecuteRequest::sql("show tables"))
            .await
            .unwrap();

        assert_eq!(
            result,
            CommandResult::new(0, "default\tevents\tfalse\n", "Time taken: 0.1 seconds\n")
        );
        assert_eq!(mock.shell_lines().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_validation_spawns_nothing() {
        let (executor, mock) = executor(|_| {});

        let err = executor.execute(&ExecuteRequest::new()).await.unwrap_err();
        assert!(matches!(err, SparkError::MissingArgument(_)));

        let err = executor
            .execute(&ExecuteRequest::sql_file("/nonexistent/job.sql"))
            .await
            .unwrap_err();
        assert!(matches!(err, SparkError::FileNotFound(_)));

        let err = executor
            .execute(&ExecuteRequest::sql("select 1").with_init_sql_file("/nonexistent/init.sql"))
            .await
            .unwrap_err();
        assert!(matches!(err, SparkError::FileNotFound(_)));

        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_print_stderr_uses_noisy_runner() {
        let (executor, mock) = executor(|mock| {
            mock.expect_shell(|_| true).returns_success().finish();
        });

        executor
            .execute(&ExecuteRequest::sql("select 1").with_print_stderr(true))
            .await
            .unwrap();

        let history = mock.calls();
        assert!(history[0].echo_stderr);
    }

    #[tokio::test]
    async fn test_load_data_success() {
        let (executor, mock) = executor(|mock| {
            mock.expect_shell(|line| {
                line.contains("overwrite into table db.tbl partition (dt='20160501')")
            })
            .returns_success()
            .finish();
        });

        let loaded = executor
            .load_data(&LoadData::new("/data/in", "db", "tbl").partition("dt", "20160501"))
            .await
            .unwrap();

        assert!(loaded);
        assert!(mock.shell_lines()[0].contains("load data local inpath '/data/in'"));
    }

    #[tokio::test]
    async fn test_load_data_failure_carries_stderr() {
        let (executor, _mock) = executor(|mock| {
            mock.expect_shell(|line| line.contains("load data"))
                .returns_exit_code(1)
                .returns_stderr("Error in query: Table or view not found: db.tbl")
                .finish();
        });

        let err = executor
            .load_data(&LoadData::new("/data/in", "db", "tbl"))
            .await
            .unwrap_err();

        match err {
            SparkError::SparkSqlCommandExecute { command, stderr } => {
                assert!(command.starts_with("load data local inpath"));
                assert_eq!(stderr, "Error in query: Table or view not found: db.tbl");
            }
            other => panic!("Expected SparkSqlCommandExecute, got {other:?}"),
        }
    }

    #[test]
    fn test_result_rows_filter_client_noise() {
        let stdout = "\nSET spark.sql.shuffle.partitions=500\ndefault\nads\n\
                      17/09/29 INFO spark.SparkContext: stopped\nlogs\n\n";

        assert_eq!(
            SparkSqlExecutor::result_rows(stdout),
            vec!["default", "ads", "logs"]
        );
        assert!(SparkSqlExecutor::result_rows("   ").is_empty());
    }
}
