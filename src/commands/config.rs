//! Config subcommands handler

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use sume::Config;

/// Resolve the config file path: an explicit `--config` or the default.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path(),
    }
}

/// Show the effective configuration as TOML.
pub fn handle_show(config: &Config) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Print the config file path.
pub fn handle_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}

/// Write the default configuration. Refuses to overwrite unless forced.
pub fn handle_init(path: &Path, force: bool) -> Result<()> {
    init_at(path, force)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub(crate) fn init_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(path)
}
