use crate::subprocess::ProcessCommand;

/// Shell used to interpret assembled command lines.
pub const SHELL: &str = "sh";

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand {
                program: program.to_string(),
                args: Vec::new(),
                echo_stderr: false,
            },
        }
    }

    /// Run `line` through `sh -c` so redirections and quoting in it are honored.
    pub fn shell(line: &str) -> Self {
        Self::new(SHELL).arg("-c").arg(line)
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    /// Forward the child's stderr to our own stderr while it is being captured.
    pub fn echo_stderr(mut self, echo: bool) -> Self {
        self.command.echo_stderr = echo;
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}
