//! Integration tests for content acquisition

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;

use sume::acquire::MediaUrlKind;
use sume::SourceDescriptor;

use crate::helpers::{Download, Harness};

// ============ Direct Text ============

#[test]
fn short_direct_text_fails_validation_without_side_effects() {
    let h = Harness::new();
    let result = h.summarizer.acquire(&SourceDescriptor::DirectText("short".to_string()));

    assert!(result.is_warning());
    assert_eq!(result.as_str(), "⚠️ Text must be at least 10 characters long");
    assert_eq!(h.summarizer.cache_stats().total(), 0);
    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.web.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn valid_direct_text_passes_through_uncached() {
    let h = Harness::new();
    let text = "Plain pasted text that is long enough.";
    let result = h.summarizer.acquire(&SourceDescriptor::DirectText(text.to_string()));
    assert_eq!(result.as_str(), text);
    assert_eq!(h.summarizer.cache_stats().total(), 0);
}

// ============ Documents ============

#[test]
fn document_extraction_is_cached_until_the_file_changes() {
    let h = Harness::new();
    let path = h.write_file("notes.txt", b"Quarterly notes on the bakery expansion plan.");
    let source = SourceDescriptor::Document(path.clone());

    let first = h.summarizer.acquire(&source);
    let second = h.summarizer.acquire(&source);
    assert_eq!(first.as_str(), "Quarterly notes on the bakery expansion plan.");
    assert_eq!(first, second);
    assert_eq!(h.documents.calls.load(Ordering::SeqCst), 1);

    std::fs::write(&path, "Quarterly notes, revised with the new oven budget.").unwrap();
    let third = h.summarizer.acquire(&source);
    assert!(third.as_str().contains("oven budget"));
    assert_eq!(h.documents.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn unsupported_document_skips_extractor() {
    let h = Harness::new();
    let path = h.write_file("table.csv", b"a,b,c\n1,2,3\n");
    let result = h.summarizer.acquire(&SourceDescriptor::Document(path));
    assert_eq!(result.as_str(), "⚠️ Unsupported file type: .csv");
    assert_eq!(h.documents.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_document_is_a_validation_warning() {
    let h = Harness::new();
    let path = h.dir().join("gone.pdf");
    let result = h.summarizer.acquire(&SourceDescriptor::Document(path));
    assert_eq!(result.as_str(), "⚠️ File does not exist");
}

#[test]
fn markdown_is_cleaned() {
    let h = Harness::new();
    let path = h.write_file("readme.md", b"# Title\n\nSome **bold** words here.");
    let result = h.summarizer.acquire(&SourceDescriptor::Document(path));
    assert_eq!(result.as_str(), "Title\n\nSome bold words here.");
}

// ============ Web Pages ============

#[test]
fn webpage_url_gets_default_scheme() {
    let h = Harness::new();
    let result = h
        .summarizer
        .acquire(&SourceDescriptor::Webpage("example.com/post".to_string()));
    assert_eq!(result.as_str(), "Main article text about city cycling lanes.");
    assert_eq!(h.web.seen.lock().unwrap()[0], "http://example.com/post");
}

#[test]
fn webpage_without_main_text_is_an_acquisition_warning() {
    let h = Harness::builder().web(None).build();
    let result = h
        .summarizer
        .acquire(&SourceDescriptor::Webpage("https://example.com".to_string()));
    assert_eq!(result.as_str(), "⚠️ No main text found in the webpage.");
}

#[test]
fn unsafe_url_never_reaches_extractor() {
    let h = Harness::new();
    let result = h
        .summarizer
        .acquire(&SourceDescriptor::Webpage("javascript:alert(1)".to_string()));
    assert!(result.is_warning());
    assert_eq!(h.web.calls.load(Ordering::SeqCst), 0);
}

// ============ Media URLs ============

#[test]
fn failed_video_download_leaves_no_temp_directory() {
    let h = Harness::builder().download(Download::Status(403)).build();
    let result = h
        .summarizer
        .acquire(&SourceDescriptor::MediaUrl("https://youtu.be/xyz".to_string()));

    assert_eq!(result.as_str(), "⚠️ Could not download media file, HTTP 403");
    assert_eq!(h.registry.live_count(), 0);
    assert_eq!(
        h.downloader.kinds.lock().unwrap().as_slice(),
        &[MediaUrlKind::ShortVideoHost]
    );
    let dirs = h.downloader.dirs.lock().unwrap();
    assert!(!dirs[0].exists());
    assert!(h.scratch_entries().is_empty());
}

#[test]
fn crashed_download_still_releases_temp_directory() {
    let h = Harness::builder().download(Download::Panic).build();
    let source = SourceDescriptor::MediaUrl("https://cdn.example.com/episode.mp3".to_string());

    let outcome = catch_unwind(AssertUnwindSafe(|| h.summarizer.acquire(&source)));

    assert!(outcome.is_err());
    assert_eq!(h.registry.live_count(), 0);
    assert!(!h.downloader.dirs.lock().unwrap()[0].exists());
    assert!(h.scratch_entries().is_empty());
    assert_eq!(h.summarizer.cache_stats().total(), 0);
}

#[test]
fn cancelled_download_is_not_cached_and_cleans_up() {
    let h = Harness::builder().download(Download::Cancel).build();
    let result = h
        .summarizer
        .acquire(&SourceDescriptor::MediaUrl("https://youtu.be/xyz".to_string()));

    assert_eq!(result.as_str(), "⚠️ Operation cancelled.");
    assert!(h.cancel.is_cancelled());
    assert_eq!(h.summarizer.cache_stats().total(), 0);
    assert_eq!(h.registry.live_count(), 0);
    assert!(!h.downloader.dirs.lock().unwrap()[0].exists());
    assert!(h.scratch_entries().is_empty());
    assert_eq!(h.recognizer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn media_url_is_transcribed_and_cleaned_up() {
    let h = Harness::new();
    let result = h.summarizer.acquire(&SourceDescriptor::MediaUrl(
        "https://cdn.example.com/episode.mp3".to_string(),
    ));

    assert_eq!(result.as_str(), "the speaker explains how heat pumps work in winter");
    assert_eq!(
        h.downloader.kinds.lock().unwrap().as_slice(),
        &[MediaUrlKind::GenericHttp]
    );
    assert_eq!(h.registry.live_count(), 0);
    for wav in h.converter.outputs.lock().unwrap().iter() {
        assert!(!wav.exists());
    }
    assert!(h.scratch_entries().is_empty());
}

#[test]
fn media_url_transcript_is_cached() {
    let h = Harness::new();
    let source = SourceDescriptor::MediaUrl("https://www.youtube.com/watch?v=abc".to_string());
    h.summarizer.acquire(&source);
    h.summarizer.acquire(&source);
    assert_eq!(h.recognizer.calls.load(Ordering::SeqCst), 1);
}

// ============ Media Files ============

#[test]
fn media_file_is_transcribed_and_temp_wav_removed() {
    let h = Harness::new();
    let path = h.write_file("talk.mp3", b"ID3 bytes");
    let result = h.summarizer.acquire(&SourceDescriptor::MediaFile(path));

    assert_eq!(result.as_str(), "the speaker explains how heat pumps work in winter");
    assert_eq!(h.registry.live_count(), 0);
    let outputs = h.converter.outputs.lock().unwrap();
    assert_eq!(outputs.len(), 1);
    assert!(!outputs[0].exists());
}

#[test]
fn crashed_recognizer_still_removes_temp_wav() {
    let h = Harness::builder().recognizer_panics().build();
    let path = h.write_file("talk.mp3", b"ID3 fake audio");

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        h.summarizer.acquire(&SourceDescriptor::MediaFile(path.clone()))
    }));

    assert!(outcome.is_err());
    assert_eq!(h.recognizer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.registry.live_count(), 0);
    for wav in h.converter.outputs.lock().unwrap().iter() {
        assert!(!wav.exists());
    }
    assert!(h.scratch_entries().is_empty());
}

#[test]
fn silent_media_is_a_recognition_warning() {
    let h = Harness::builder().transcript("   ").build();
    let path = h.write_file("silence.wav", b"RIFF");
    let result = h.summarizer.acquire(&SourceDescriptor::MediaFile(path));
    assert_eq!(result.as_str(), "⚠️ Could not recognize speech.");
    assert_eq!(h.registry.live_count(), 0);
}

#[test]
fn unsupported_media_file_skips_recognition() {
    let h = Harness::new();
    let path = h.write_file("notes.txt", b"not audio at all");
    let result = h.summarizer.acquire(&SourceDescriptor::MediaFile(path));
    assert_eq!(result.as_str(), "⚠️ Unsupported file type: .txt");
    assert_eq!(h.recognizer.calls.load(Ordering::SeqCst), 0);
}
