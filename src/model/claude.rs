//! Claude backend implementation.
//!
//! Invokes the Claude CLI with `--print --output-format json --tools ""`.

use std::process::Command;
use std::time::Duration;

use super::{extract_response_text, invoke_cli, GenerativeModel, ModelResult};
use crate::lifecycle::{command_exists, CancelToken};

/// Backend for Claude CLI.
#[derive(Debug, Clone, Default)]
pub struct ClaudeBackend {
    /// Extra CLI arguments to pass before the stdin passthrough args.
    extra_args: Vec<String>,
}

impl ClaudeBackend {
    pub fn new() -> Self {
        Self {
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(extra_args: Vec<String>) -> Self {
        Self { extra_args }
    }

    fn command() -> &'static str {
        "claude"
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(Self::command());
        cmd.args(["--print", "--output-format", "json"]);
        cmd.args(&self.extra_args);
        // Disable tools; "-p -" reads the prompt from stdin (avoids ARG_MAX limits)
        cmd.args(["--tools", "", "-p", "-"]);
        cmd
    }
}

impl GenerativeModel for ClaudeBackend {
    fn name(&self) -> &'static str {
        "Claude"
    }

    fn is_available(&self) -> bool {
        command_exists(Self::command())
    }

    fn generate(&self, prompt: &str, timeout: Duration, cancel: &CancelToken) -> ModelResult<String> {
        let mut cmd = self.build_command();
        let stdout = invoke_cli(&mut cmd, prompt, timeout, cancel)?;
        extract_response_text(&stdout)
    }
}
