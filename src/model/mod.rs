//! Generative text model backends.
//!
//! Each backend drives an agent CLI non-interactively: the prompt goes in on
//! stdin and the response text comes back on stdout, usually wrapped in a
//! small JSON envelope.
//!
//! # Supported Backends
//!
//! - **Gemini**: `gemini --output-format json --approval-mode plan --prompt -`
//! - **Claude**: `claude --print --output-format json --tools "" -p -`
//!
//! Backends are stateless and can be used from several threads at once.

mod claude;
mod gemini;

pub use claude::ClaudeBackend;
pub use gemini::GeminiBackend;

use std::process::Command;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ModelConfig;
use crate::lifecycle::process::truncate_stderr;
use crate::lifecycle::{run_command, CancelToken, ProcessError};

/// Result type for model calls.
pub type ModelResult<T> = Result<T, ModelError>;

/// A stateless single-shot text generator.
pub trait GenerativeModel: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Check if the backend CLI is available on the system.
    fn is_available(&self) -> bool;

    /// Send one prompt and return the response text.
    ///
    /// An empty response is reported as [`ModelError::EmptyResponse`].
    fn generate(&self, prompt: &str, timeout: Duration, cancel: &CancelToken)
        -> ModelResult<String>;
}

/// Errors from model backends.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model CLI not found: {0}")]
    NotAvailable(String),

    #[error("Model timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model call cancelled")]
    Cancelled,

    #[error("Exit code {code}: {}", truncate_stderr(stderr))]
    ExitCode { code: i32, stderr: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModelError::Cancelled)
    }
}

/// Backend types selectable in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Gemini,
    Claude,
}

impl ModelKind {
    /// Create the backend for this kind.
    pub fn create_backend(&self, extra_args: Vec<String>) -> Arc<dyn GenerativeModel> {
        match self {
            ModelKind::Gemini => Arc::new(GeminiBackend::with_extra_args(extra_args)),
            ModelKind::Claude => Arc::new(ClaudeBackend::with_extra_args(extra_args)),
        }
    }

    /// Get the CLI command name for this backend.
    pub fn command_name(&self) -> &'static str {
        match self {
            ModelKind::Gemini => "gemini",
            ModelKind::Claude => "claude",
        }
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self, String> {
        config.backend.parse()
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ModelKind::Gemini),
            "claude" => Ok(ModelKind::Claude),
            other => Err(format!("Unknown model backend '{}'", other)),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Gemini => write!(f, "Gemini"),
            ModelKind::Claude => write!(f, "Claude"),
        }
    }
}

/// Run a backend command with the prompt on stdin and return its stdout.
pub(crate) fn invoke_cli(
    cmd: &mut Command,
    prompt: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> ModelResult<String> {
    match run_command(cmd, Some(prompt.as_bytes()), timeout, cancel) {
        Ok(output) => Ok(String::from_utf8_lossy(&output.stdout).to_string()),
        Err(ProcessError::NotFound(cmd)) => {
            Err(ModelError::NotAvailable(format!("{} CLI not found in PATH", cmd)))
        }
        Err(ProcessError::Timeout(_)) => Err(ModelError::Timeout(timeout)),
        Err(ProcessError::Cancelled) => Err(ModelError::Cancelled),
        Err(ProcessError::ExitCode { code, stderr }) => {
            if is_rate_limited(&stderr) {
                let message = stderr.lines().next().unwrap_or("Rate limited").to_string();
                return Err(ModelError::RateLimited(message));
            }
            Err(ModelError::ExitCode { code, stderr })
        }
        Err(ProcessError::Io(e)) => Err(ModelError::Io(e)),
    }
}

fn is_rate_limited(stderr: &str) -> bool {
    static STATUS_429: OnceLock<Regex> = OnceLock::new();
    let lower = stderr.to_lowercase();
    let keyword = ["rate limit", "throttled", "resource_exhausted", "too many requests", "quota exceeded"]
        .iter()
        .any(|needle| lower.contains(needle));
    // 429 only counts as an HTTP status, not as any number in the message.
    keyword
        || STATUS_429
            .get_or_init(|| {
                Regex::new(r"\b(?:http(?:/[\d.]+)?|status(?: code)?|code|error)[\s:=(]*429\b")
                    .expect("static regex must compile")
            })
            .is_match(&lower)
}

/// JSON envelope printed by agent CLIs in `--output-format json` mode.
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    /// Gemini
    response: Option<String>,
    /// Claude
    result: Option<String>,
    is_error: Option<bool>,
}

/// Pull the response text out of a CLI's stdout.
///
/// Falls back to the raw text when stdout is not a known envelope.
pub(crate) fn extract_response_text(stdout: &str) -> ModelResult<String> {
    let trimmed = stdout.trim();
    let text = match serde_json::from_str::<ResponseEnvelope>(trimmed) {
        Ok(envelope) => {
            if envelope.is_error == Some(true) {
                return Err(ModelError::ExitCode {
                    code: 1,
                    stderr: envelope
                        .result
                        .unwrap_or_else(|| "model returned an error".to_string()),
                });
            }
            envelope.response.or(envelope.result).unwrap_or_default()
        }
        Err(_) => trimmed.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        Err(ModelError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}
