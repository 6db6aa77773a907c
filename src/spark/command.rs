use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::{setting_flag, ExecuteRequest, Variables};
use crate::error::{Result, SparkError};
use crate::subprocess::{ProcessCommandBuilder, ProcessOutput, ProcessRunner};

/// Exit status and captured output of one client invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    status: i32,
    stdout: String,
    stderr: String,
}

impl CommandResult {
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

impl From<ProcessOutput> for CommandResult {
    fn from(output: ProcessOutput) -> Self {
        Self {
            status: output.status.as_shell_status(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// A client executable together with the settings passed on every call.
#[derive(Clone)]
pub struct SparkClient {
    program: String,
    variables: Variables,
    verbose: bool,
    runner: Arc<dyn ProcessRunner>,
}

impl fmt::Debug for SparkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparkClient")
            .field("program", &self.program)
            .field("variables", &self.variables)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl SparkClient {
    /// Resolve `program` on the search path before accepting it.
    ///
    /// `not_found` builds the client specific error for an unresolved program.
    pub(crate) fn resolve(
        program: String,
        variables: Variables,
        verbose: bool,
        runner: Arc<dyn ProcessRunner>,
        not_found: fn(String) -> SparkError,
    ) -> Result<Self> {
        if program.trim().is_empty() {
            return Err(SparkError::MissingArgument(
                "client path must not be empty".to_string(),
            ));
        }

        match which::which(&program) {
            Ok(path) => tracing::debug!("Resolved {} to {}", program, path.display()),
            Err(e) => {
                tracing::debug!("Could not resolve {}: {}", program, e);
                return Err(not_found(program));
            }
        }

        Ok(Self {
            program,
            variables,
            verbose,
            runner,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Assemble the shell command line for `request`.
    ///
    /// Inline SQL is prefixed with `init_settings` joined by `;`.
    pub fn render(&self, request: &ExecuteRequest, init_settings: &[String]) -> Result<String> {
        request.validate()?;

        let mut parts: Vec<Cow<'_, str>> = vec![shell_words::quote(&self.program)];

        if self.verbose {
            parts.push("-v".into());
        }

        if let Some(init) = &request.init_sql_file {
            parts.push("-i".into());
            parts.push(quote_path(init));
        }

        for (key, value) in &self.variables {
            match setting_flag(key) {
                Some(flag) => {
                    parts.push(flag.into());
                    parts.push(shell_words::quote(value));
                }
                None => {
                    parts.push("--conf".into());
                    parts.push(
                        format!("{}={}", shell_words::quote(key), shell_words::quote(value))
                            .into(),
                    );
                }
            }
        }

        if let Some(sql) = &request.sql {
            let text = if init_settings.is_empty() {
                sql.clone()
            } else {
                format!("{};{}", init_settings.join(";"), sql)
            };
            parts.push("-e".into());
            parts.push(double_quote(&text).into());
        } else if let Some(file) = &request.sql_file {
            parts.push("-f".into());
            parts.push(quote_path(file));
        }

        if let Some(output) = &request.output_file {
            parts.push("1>".into());
            parts.push(quote_path(output));
        } else if let Some(log) = &request.log_file {
            parts.push("2>".into());
            parts.push(quote_path(log));
        }

        Ok(parts.join(" "))
    }

    /// Run a rendered command line through the shell.
    pub async fn run(&self, line: &str, print_stderr: bool) -> Result<CommandResult> {
        tracing::info!("Executing: {}", line);

        let command = ProcessCommandBuilder::shell(line)
            .echo_stderr(print_stderr)
            .build();
        let output = self.runner.run(command).await?;

        Ok(CommandResult::from(output))
    }
}

fn quote_path(path: &Path) -> Cow<'_, str> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => shell_words::quote(s),
        Cow::Owned(s) => Cow::Owned(shell_words::quote(&s).into_owned()),
    }
}

/// Wrap `text` in double quotes, escaping what the shell expands inside them.
fn double_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
