//! Integration tests for the Summarizer facade

use sume::{ExtendMode, PipelineRequest, SourceDescriptor};

use crate::helpers::{CountingModel, Harness, ARTICLE};

// ============ Single Operations ============

#[test]
fn repeated_summarize_hits_the_cache() {
    let h = Harness::new();
    let first = h.summarizer.summarize(ARTICLE);
    let second = h.summarizer.summarize(ARTICLE);

    assert!(!first.is_warning());
    assert_eq!(first, second);
    assert_eq!(h.model.calls(), 1);
    assert_eq!(h.summarizer.cache_size_message(), "Cache size: 1 items");
}

#[test]
fn prompt_embeds_the_text() {
    let h = Harness::new();
    h.summarizer.summarize(ARTICLE);
    assert_eq!(
        h.model.prompts()[0],
        format!("Summarize the following text:\n\n{}", ARTICLE)
    );
}

#[test]
fn warnings_pass_through_every_stage() {
    let h = Harness::new();
    let upstream = "⚠️ Could not download content from URL: HTTP 500";

    assert_eq!(h.summarizer.summarize(upstream).as_str(), upstream);
    assert_eq!(h.summarizer.summarize_chunked(upstream).as_str(), upstream);
    assert_eq!(h.summarizer.extend(upstream).as_str(), upstream);
    assert_eq!(
        h.summarizer.extend_custom(upstream, "battery storage").as_str(),
        upstream
    );
    assert_eq!(h.summarizer.translate(upstream, "French").as_str(), upstream);
    assert_eq!(h.model.calls(), 0);
}

#[test]
fn model_failure_becomes_prefixed_warning_and_is_cached() {
    let h = Harness::builder().model(CountingModel::failing()).build();
    let first = h.summarizer.summarize(ARTICLE);
    assert_eq!(
        first.as_str(),
        "⚠️ Summarization error: Exit code 1: backend exploded"
    );
    let second = h.summarizer.summarize(ARTICLE);
    assert_eq!(first, second);
    assert_eq!(h.model.calls(), 1);
}

#[test]
fn custom_focus_is_validated() {
    let h = Harness::new();
    assert_eq!(
        h.summarizer.extend_custom("A summary.", "  ").as_str(),
        "⚠️ Please enter specific details to focus on."
    );
    assert_eq!(
        h.summarizer.extend_custom("A summary.", "abc").as_str(),
        "⚠️ Custom prompt must be at least 5 characters long"
    );
    let long = "x".repeat(501);
    assert!(h.summarizer.extend_custom("A summary.", &long).is_warning());
    assert_eq!(h.model.calls(), 0);
}

#[test]
fn translate_normalizes_language_names() {
    let h = Harness::new();
    let a = h.summarizer.translate("Hello there, friend.", "french");
    let b = h.summarizer.translate("Hello there, friend.", " French ");
    assert_eq!(a, b);
    assert_eq!(h.model.calls(), 1);
    assert!(h.model.prompts()[0].starts_with("Translate the following text into French:"));
}

#[test]
fn translate_rejects_bad_language() {
    let h = Harness::new();
    let result = h.summarizer.translate("Hello there, friend.", "x");
    assert_eq!(result.as_str(), "⚠️ Language name is too short");
}

#[test]
fn cancelled_work_is_not_cached() {
    let h = Harness::new();
    h.cancel.cancel();
    assert_eq!(h.summarizer.summarize(ARTICLE).as_str(), "⚠️ Operation cancelled.");
    assert_eq!(h.summarizer.cache_stats().total(), 0);
    assert_eq!(h.model.calls(), 0);
}

#[test]
fn clear_cache_reports_and_empties() {
    let h = Harness::new();
    h.summarizer.summarize(ARTICLE);
    assert_eq!(h.summarizer.clear_cache(), "Cache cleared successfully!");
    assert_eq!(h.summarizer.cache_size_message(), "Cache size: 0 items");
    h.summarizer.summarize(ARTICLE);
    assert_eq!(h.model.calls(), 2);
}

// ============ Chunked Documents ============

#[test]
fn summarize_file_joins_chunk_summaries_in_order() {
    let h = Harness::builder().config(|c| c.chunking.max_words = 5).build();
    let path = h.write_file(
        "essay.txt",
        b"one two three four five six seven eight nine ten eleven twelve",
    );

    let result = h.summarizer.summarize_file(&path);
    assert_eq!(
        result.as_str(),
        "summary<one two three four five>\n\n\
         summary<six seven eight nine ten>\n\n\
         summary<eleven twelve>"
    );
    assert_eq!(h.model.calls(), 3);

    h.summarizer.summarize_file(&path);
    assert_eq!(h.model.calls(), 3);
}

#[test]
fn summarize_file_with_all_chunks_failing() {
    let h = Harness::builder()
        .model(CountingModel::failing())
        .config(|c| c.chunking.max_words = 2)
        .build();
    let path = h.write_file("essay.txt", b"alpha beta gamma delta");
    assert_eq!(
        h.summarizer.summarize_file(&path).as_str(),
        "⚠️ Summarization failed."
    );
    assert_eq!(h.model.calls(), 2);
}

// ============ Full Requests ============

#[test]
fn run_extends_then_translates_the_extension() {
    let h = Harness::new();
    let request = PipelineRequest::new(SourceDescriptor::DirectText(ARTICLE.to_string()))
        .extend(ExtendMode::Detailed)
        .translate("German");
    let output = h.summarizer.run(&request);

    let summary = format!("summary<{}>", ARTICLE);
    let extended = format!("summary<{}>", summary);
    assert_eq!(output.summary.as_str(), summary);
    assert_eq!(output.extended.as_ref().unwrap().as_str(), extended);
    assert!(!output.is_warning());
    assert_eq!(h.model.calls(), 3);
    assert!(h.model.prompts()[2].ends_with(&extended));
    assert_eq!(output.delivered(), output.translated.as_ref().unwrap());
}

#[test]
fn run_with_focus_uses_custom_prompt() {
    let h = Harness::new();
    let request = PipelineRequest::new(SourceDescriptor::DirectText(ARTICLE.to_string()))
        .extend(ExtendMode::Focus("storage costs".to_string()));
    let output = h.summarizer.run(&request);

    assert!(output.translated.is_none());
    assert!(h.model.prompts()[1]
        .starts_with("Expand the following summary with specific focus on: storage costs"));
    assert_eq!(output.delivered(), output.extended.as_ref().unwrap());
}

#[test]
fn run_stops_at_failed_acquisition() {
    let h = Harness::builder().web(None).build();
    let request = PipelineRequest::new(SourceDescriptor::Webpage("example.org".to_string()))
        .extend(ExtendMode::Detailed)
        .translate("Spanish");
    let output = h.summarizer.run(&request);

    let warning = "⚠️ No main text found in the webpage.";
    assert_eq!(output.summary.as_str(), warning);
    assert_eq!(output.extended.as_ref().unwrap().as_str(), warning);
    assert_eq!(output.translated.as_ref().unwrap().as_str(), warning);
    assert!(output.is_warning());
    assert_eq!(h.model.calls(), 0);
}

#[test]
fn run_on_media_file_leaves_no_temp_paths() {
    let h = Harness::new();
    let path = h.write_file("lecture.m4a", b"m4a bytes");
    let output = h.summarizer.run(&PipelineRequest::new(SourceDescriptor::MediaFile(path)));

    assert_eq!(
        output.summary.as_str(),
        "summary<the speaker explains how heat pumps work in winter>"
    );
    assert_eq!(h.registry.live_count(), 0);
    assert!(h.scratch_entries().is_empty());
}
