use std::sync::Arc;

use super::{
    default_submit_variables, CommandResult, ExecuteRequest, SparkClient, Variables,
    DEFAULT_SUBMIT_CLIENT,
};
use crate::error::{Result, SparkError};
use crate::subprocess::{ProcessRunner, TokioProcessRunner};

/// Wrapper around the `spark-submit` client.
#[derive(Debug, Clone)]
pub struct SparkExecutor {
    client: SparkClient,
}

impl SparkExecutor {
    pub fn builder(client: impl Into<String>) -> SparkExecutorBuilder {
        SparkExecutorBuilder::new(client)
    }

    pub fn new(client: impl Into<String>) -> Result<Self> {
        Self::builder(client).build()
    }

    pub fn client(&self) -> &SparkClient {
        &self.client
    }

    pub fn command_line(&self, request: &ExecuteRequest) -> Result<String> {
        self.client.render(request, &[])
    }

    pub async fn execute(&self, request: &ExecuteRequest) -> Result<CommandResult> {
        let line = self.command_line(request)?;
        self.client.run(&line, request.print_stderr).await
    }

    /// Like [`execute`](Self::execute), but a non-zero exit is an error.
    pub async fn execute_checked(&self, request: &ExecuteRequest) -> Result<CommandResult> {
        let line = self.command_line(request)?;
        let result = self.client.run(&line, request.print_stderr).await?;
        if result.success() {
            return Ok(result);
        }

        tracing::error!("spark command exited with status {}", result.status());
        Err(SparkError::SparkCommandExecute {
            command: line,
            stderr: result.stderr().to_string(),
        })
    }
}

pub struct SparkExecutorBuilder {
    client: String,
    variables: Variables,
    verbose: bool,
    runner: Option<Arc<dyn ProcessRunner>>,
}

impl SparkExecutorBuilder {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            variables: default_submit_variables(),
            verbose: false,
            runner: None,
        }
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
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

    pub fn build(self) -> Result<SparkExecutor> {
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(TokioProcessRunner) as Arc<dyn ProcessRunner>);
        let client = SparkClient::resolve(
            self.client,
            self.variables,
            self.verbose,
            runner,
            SparkError::SparkUnfound,
        )?;

        Ok(SparkExecutor { client })
    }
}

impl Default for SparkExecutorBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_CLIENT)
    }
}
