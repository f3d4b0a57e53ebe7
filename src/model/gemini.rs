//! Gemini backend implementation.
//!
//! Invokes the Gemini CLI with `--output-format json --approval-mode plan`.
//! The `--approval-mode plan` flag keeps the CLI read-only (no tool execution).

use std::process::Command;
use std::time::Duration;

use super::{extract_response_text, invoke_cli, GenerativeModel, ModelResult};
use crate::lifecycle::{command_exists, CancelToken};

/// Backend for Gemini CLI.
#[derive(Debug, Clone, Default)]
pub struct GeminiBackend {
    /// Extra CLI arguments to pass to the gemini command.
    extra_args: Vec<String>,
}

impl GeminiBackend {
    /// Create a new Gemini backend with no extra arguments.
    pub fn new() -> Self {
        Self {
            extra_args: Vec::new(),
        }
    }

    /// Create a new Gemini backend with extra CLI arguments.
    pub fn with_extra_args(extra_args: Vec<String>) -> Self {
        Self { extra_args }
    }

    fn command() -> &'static str {
        "gemini"
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(Self::command());
        cmd.args(["--output-format", "json"]);
        cmd.args(&self.extra_args);
        // Safety flags placed AFTER extra_args to prevent override.
        cmd.args(["--approval-mode", "plan", "--prompt", "-"]);
        cmd
    }
}

impl GenerativeModel for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
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
