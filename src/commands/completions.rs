//! Completions command handler

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};
use std::io::{self, Write};

/// Generate a shell completion script on stdout.
#[cfg(not(tarpaulin_include))]
pub fn handle<C: CommandFactory>(shell: CompletionShell) -> Result<()> {
    write_completions::<C, _>(shell, &mut io::stdout())
}

pub(crate) fn write_completions<C: CommandFactory, W: Write>(
    shell: CompletionShell,
    out: &mut W,
) -> Result<()> {
    let mut cmd = C::command();
    generate(shell, &mut cmd, "sume", out);
    Ok(())
}
