use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::builder::SHELL;
use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};

type LineMatcher = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Runner that answers `sh -c <line>` invocations with canned output.
///
/// Every line is recorded, matched or not. Responses are tried in the order
/// they were registered and may answer any number of calls.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    responses: Arc<Mutex<Vec<CannedResponse>>>,
    calls: Arc<Mutex<Vec<ShellCall>>>,
}

struct CannedResponse {
    matcher: LineMatcher,
    output: ProcessOutput,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCall {
    pub line: String,
    pub echo_stderr: bool,
}

/// Builder for a response; registered on [`ShellResponse::finish`].
pub struct ShellResponse {
    runner: MockProcessRunner,
    response: CannedResponse,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn shell_line(command: &ProcessCommand) -> Option<&str> {
    match command.args.as_slice() {
        [flag, line] if command.program == SHELL && flag == "-c" => Some(line.as_str()),
        _ => None,
    }
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer command lines for which `matcher` returns true.
    pub fn expect_shell<F>(&mut self, matcher: F) -> ShellResponse
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        ShellResponse {
            runner: self.clone(),
            response: CannedResponse {
                matcher: Box::new(matcher),
                output: ProcessOutput {
                    status: ExitStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration: Duration::from_millis(10),
                },
            },
        }
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        locked(&self.calls).clone()
    }

    /// Command lines in call order.
    pub fn shell_lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.line).collect()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let line = shell_line(&command).ok_or_else(|| {
            ProcessError::MockExpectationNotMet(format!(
                "Expected a shell command line, got: {}",
                command.display()
            ))
        })?;

        locked(&self.calls).push(ShellCall {
            line: line.to_string(),
            echo_stderr: command.echo_stderr,
        });

        locked(&self.responses)
            .iter()
            .find(|response| (response.matcher)(line))
            .map(|response| response.output.clone())
            .ok_or_else(|| {
                ProcessError::MockExpectationNotMet(format!("No response for command line: {line}"))
            })
    }
}

impl ShellResponse {
    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        self.response.output.stdout = stdout.to_string();
        self
    }

    pub fn returns_stderr(mut self, stderr: &str) -> Self {
        self.response.output.stderr = stderr.to_string();
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        self.response.output.status = if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        };
        self
    }

    pub fn returns_success(self) -> Self {
        self.returns_exit_code(0)
    }

    pub fn finish(self) {
        locked(&self.runner.responses).push(self.response);
    }
}
