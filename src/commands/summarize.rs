//! Pipeline command handlers: one request from a source, plus the
//! standalone extend and translate commands.

use anyhow::Result;
use std::io::{self, Write};
use tracing::info;

use sume::validation::file_info;
use sume::{PipelineOutput, PipelineRequest, PipelineResult, SourceDescriptor, Summarizer};

/// Run one request and print every stage that ran.
///
/// Returns whether the delivered result is a success.
pub fn handle(summarizer: &Summarizer, request: &PipelineRequest, stats: bool) -> Result<bool> {
    if let SourceDescriptor::Document(path) | SourceDescriptor::MediaFile(path) = &request.source {
        if let Some(info) = file_info(path) {
            info!(
                "Processing {} ({:.2} MB), estimated {}",
                path.display(),
                info.size_mb(),
                info.estimate_processing_time()
            );
        }
    }
    let output = summarizer.run(request);
    let mut stdout = io::stdout().lock();
    write_output(&mut stdout, &output, request.translate.as_deref())?;
    if stats {
        print_stats(summarizer);
    }
    Ok(!output.is_warning())
}

/// `sume extend`: expand a summary, in detail or with a focus.
pub fn handle_extend(summarizer: &Summarizer, summary: &str, focus: Option<&str>) -> Result<bool> {
    let result = match focus {
        Some(focus) => summarizer.extend_custom(summary, focus),
        None => summarizer.extend(summary),
    };
    print_result(&result)
}

/// `sume translate`
pub fn handle_translate(summarizer: &Summarizer, text: &str, language: &str) -> Result<bool> {
    print_result(&summarizer.translate(text, language))
}

fn print_result(result: &PipelineResult) -> Result<bool> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", result)?;
    Ok(!result.is_warning())
}

/// Cache statistics go to stderr so stdout stays pipeable.
pub fn print_stats(summarizer: &Summarizer) {
    eprintln!("{}", summarizer.cache_size_message());
    eprintln!("{}", summarizer.cache_stats());
}

/// A lone summary is printed bare. With more stages each gets a heading.
pub(crate) fn write_output<W: Write>(
    out: &mut W,
    output: &PipelineOutput,
    language: Option<&str>,
) -> Result<()> {
    if output.extended.is_none() && output.translated.is_none() {
        writeln!(out, "{}", output.summary)?;
        return Ok(());
    }

    writeln!(out, "Summary:\n{}", output.summary)?;
    if let Some(extended) = &output.extended {
        writeln!(out, "\nExtended:\n{}", extended)?;
    }
    if let Some(translated) = &output.translated {
        writeln!(out, "\nTranslation ({}):\n{}", language.unwrap_or("?"), translated)?;
    }
    Ok(())
}
