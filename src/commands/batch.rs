//! Batch command handler
//!
//! Runs one request per input line through a single summarizer, so repeated
//! sources are served from the cache.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use sume::{SourceDescriptor, SourceKind, Summarizer};

use super::summarize::{print_stats, write_output};
use crate::cli::StageArgs;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchLine {
    Request(SourceDescriptor),
    Stats,
    Clear,
    Skip,
}

/// Parse `<kind> <value>`, `!stats` or `!clear`. Blank and `#` lines skip.
pub fn parse_line(line: &str) -> Result<BatchLine, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(BatchLine::Skip);
    }
    match line {
        "!stats" => return Ok(BatchLine::Stats),
        "!clear" => return Ok(BatchLine::Clear),
        _ => {}
    }

    let (kind, value) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("Expected '<kind> <value>', got '{}'", line))?;
    let kind = SourceKind::from_str(kind, true).map_err(|_| {
        format!(
            "Unknown source kind '{}'. Valid: text, file, web, media-url, media-file",
            kind
        )
    })?;
    Ok(BatchLine::Request(SourceDescriptor::new(kind, value.trim())))
}

/// Returns whether every request succeeded.
#[cfg(not(tarpaulin_include))]
pub fn handle(summarizer: &Summarizer, file: Option<&Path>, stages: &StageArgs) -> Result<bool> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    run(summarizer, reader, &mut io::stdout().lock(), stages)
}

pub(crate) fn run<R: BufRead, W: Write>(
    summarizer: &Summarizer,
    reader: R,
    out: &mut W,
    stages: &StageArgs,
) -> Result<bool> {
    let mut all_ok = true;
    let mut count = 0;

    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read batch input")?;
        match parse_line(&line) {
            Ok(BatchLine::Skip) => {}
            Ok(BatchLine::Stats) => {
                writeln!(out, "{}", summarizer.cache_size_message())?;
                writeln!(out, "{}", summarizer.cache_stats())?;
            }
            Ok(BatchLine::Clear) => writeln!(out, "{}", summarizer.clear_cache())?,
            Ok(BatchLine::Request(source)) => {
                count += 1;
                let request = stages.request(source);
                let output = summarizer.run(&request);
                writeln!(out, "# [{}] line {}", count, number + 1)?;
                write_output(out, &output, request.translate.as_deref())?;
                writeln!(out)?;
                all_ok &= !output.is_warning();
            }
            Err(message) => {
                tracing::warn!("Skipping line {}: {}", number + 1, message);
                all_ok = false;
            }
        }
    }

    if stages.stats {
        print_stats(summarizer);
    }
    Ok(all_ok)
}
