//! Languages command handler

use anyhow::Result;

use sume::languages::LANGUAGES;

/// Print the known translation targets, one per line.
pub fn handle() -> Result<()> {
    for language in LANGUAGES {
        println!("{}", language);
    }
    Ok(())
}
