//! Doctor command handler
//!
//! Reports which external tools the configured pipeline needs and whether
//! each one is on PATH.

use anyhow::Result;

use sume::lifecycle::command_exists;
use sume::{Config, ModelKind};

/// One external tool check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCheck {
    pub purpose: &'static str,
    pub command: String,
    pub found: bool,
}

/// Tools named by the config, checked with `check`.
pub(crate) fn tool_checks<F>(config: &Config, check: F) -> Vec<ToolCheck>
where
    F: Fn(&str) -> bool,
{
    let model = ModelKind::from_config(&config.model)
        .map(|kind| kind.command_name().to_string())
        .unwrap_or_else(|_| config.model.backend.clone());

    [
        ("model", model),
        ("media download", config.media.ytdlp_command.clone()),
        ("audio conversion", config.media.ffmpeg_command.clone()),
        ("speech recognition", config.media.whisper_command.clone()),
    ]
    .into_iter()
    .map(|(purpose, command)| ToolCheck {
        purpose,
        found: check(&command),
        command,
    })
    .collect()
}

/// Returns whether every tool was found.
#[cfg(not(tarpaulin_include))]
pub fn handle(config: &Config) -> Result<bool> {
    let checks = tool_checks(config, command_exists);
    for check in &checks {
        let mark = if check.found { "ok" } else { "missing" };
        println!("{:<20} {:<12} {}", check.purpose, check.command, mark);
    }

    match Config::config_path() {
        Ok(path) if path.exists() => println!("\nConfig: {}", path.display()),
        Ok(path) => println!("\nConfig: {} (not created, using defaults)", path.display()),
        Err(e) => println!("\nConfig: unavailable ({})", e),
    }
    let temp = config.temp_root().unwrap_or_else(std::env::temp_dir);
    println!("Temp:   {}", temp.display());

    Ok(checks.iter().all(|c| c.found))
}
