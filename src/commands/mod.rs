//! Command handlers for the sume CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod batch;
pub mod completions;
pub mod config;
pub mod doctor;
pub mod languages;
pub mod summarize;

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;

use sume::{Collaborators, Config, ShutdownGuard, Summarizer, TempRegistry};

/// A summarizer plus the shutdown guard that owns its temp files.
///
/// Dropping the session releases any temp path still tracked.
pub struct Session {
    pub summarizer: Summarizer,
    guard: ShutdownGuard,
}

impl Session {
    /// Build the real collaborators and install signal handling.
    #[cfg(not(tarpaulin_include))]
    pub fn start(config: &Config) -> Result<Self> {
        let registry = Arc::new(match config.temp_root() {
            Some(root) => TempRegistry::with_root(root),
            None => TempRegistry::new(),
        });
        let guard = ShutdownGuard::new(registry.clone());
        guard.register_signal_handlers();
        guard.watch_parent();

        let collaborators = Collaborators::from_config(config, registry.clone())
            .context("Failed to set up backends")?;
        let summarizer = Summarizer::new(config, collaborators, registry, guard.token());
        Ok(Self { summarizer, guard })
    }

    pub fn was_interrupted(&self) -> bool {
        self.guard.should_terminate()
    }
}

/// Read an argument, or all of stdin when it is `-`.
pub fn read_input(arg: &str) -> Result<String> {
    read_input_from(arg, io::stdin().lock())
}

pub(crate) fn read_input_from<R: Read>(arg: &str, mut reader: R) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

/// Exit status for a delivered result: 1 when it is a warning.
pub fn exit_status(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
