//! Input checks run before any expensive work.
//!
//! Every check returns a validation-category [`PipelineError`] so callers
//! short-circuit without touching the network, the filesystem beyond a
//! metadata read, or the model.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use url::{ParseError, Url};

use crate::acquire::DocumentKind;
use crate::outcome::PipelineError;

pub const MAX_DOCUMENT_SIZE: u64 = 50 * 1024 * 1024;
pub const MAX_MEDIA_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_TEXT_LENGTH: usize = 1_000_000;
pub const MIN_TEXT_LENGTH: usize = 10;
pub const MAX_URL_LENGTH: usize = 2048;
pub const MIN_PROMPT_LENGTH: usize = 5;
pub const MAX_PROMPT_LENGTH: usize = 500;
pub const MIN_LANGUAGE_LENGTH: usize = 2;
pub const MAX_LANGUAGE_LENGTH: usize = 100;

pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "docx", "pdf"];
pub const MEDIA_EXTENSIONS: &[&str] = &["mp3", "mp4", "wav", "m4a", "webm", "avi", "mov"];

const UNSAFE_URL_PATTERNS: &[&str] = &["javascript:", "data:", "file:"];
const MIN_UNIQUE_WORD_RATIO: f64 = 0.3;

/// Lowercase extension without the dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn validate_text(text: &str) -> Result<(), PipelineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::validation("Text cannot be empty"));
    }

    let length = trimmed.chars().count();
    if length < MIN_TEXT_LENGTH {
        return Err(PipelineError::validation(format!(
            "Text must be at least {} characters long",
            MIN_TEXT_LENGTH
        )));
    }
    if length > MAX_TEXT_LENGTH {
        return Err(PipelineError::validation(format!(
            "Text is too long (maximum {} characters)",
            MAX_TEXT_LENGTH
        )));
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() < MIN_TEXT_LENGTH {
        return Err(PipelineError::validation(
            "Text contains too much whitespace or special characters",
        ));
    }

    if words.len() > 10 {
        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let ratio = unique.len() as f64 / words.len() as f64;
        if ratio < MIN_UNIQUE_WORD_RATIO {
            return Err(PipelineError::validation(
                "Text appears to contain excessive repetition",
            ));
        }
    }

    Ok(())
}

fn file_size(path: &Path) -> Result<u64, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::validation("File does not exist"));
    }
    let meta = fs::metadata(path)
        .map_err(|e| PipelineError::validation(format!("Cannot read file: {}", e)))?;
    if !meta.is_file() {
        return Err(PipelineError::validation("Path is not a file"));
    }
    if meta.len() == 0 {
        return Err(PipelineError::validation("File is empty"));
    }
    Ok(meta.len())
}

fn too_large(limit: u64) -> PipelineError {
    PipelineError::validation(format!(
        "File is too large (maximum {}MB)",
        limit / (1024 * 1024)
    ))
}

/// Check a document path and resolve its extractor kind.
pub fn validate_document(path: &Path) -> Result<DocumentKind, PipelineError> {
    let size = file_size(path)?;
    if size > MAX_DOCUMENT_SIZE {
        return Err(too_large(MAX_DOCUMENT_SIZE));
    }
    let ext = extension_of(path);
    DocumentKind::from_extension(&ext)
        .ok_or_else(|| PipelineError::validation(format!("Unsupported file type: .{}", ext)))
}

/// Check a media path. Returns its lowercase extension.
pub fn validate_media_file(path: &Path) -> Result<String, PipelineError> {
    let size = file_size(path)?;
    if size > MAX_MEDIA_SIZE {
        return Err(too_large(MAX_MEDIA_SIZE));
    }
    let ext = extension_of(path);
    if !MEDIA_EXTENSIONS.contains(&ext.as_str()) {
        return Err(PipelineError::validation(format!(
            "Unsupported file type: .{}",
            ext
        )));
    }
    Ok(ext)
}

/// Check a URL and normalize it; a missing scheme becomes `http://`.
pub fn validate_url(raw: &str) -> Result<Url, PipelineError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PipelineError::validation("URL cannot be empty"));
    }
    if raw.chars().count() > MAX_URL_LENGTH {
        return Err(PipelineError::validation(format!(
            "URL is too long (maximum {} characters)",
            MAX_URL_LENGTH
        )));
    }

    let lowered = raw.to_lowercase();
    if UNSAFE_URL_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return Err(PipelineError::validation("URL contains unsafe content"));
    }

    let invalid = || PipelineError::validation("Invalid URL format");
    // Only a scheme-less input is relative; any parsed scheme is kept as written.
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{}", raw)).map_err(|_| invalid())?
        }
        Err(_) => return Err(invalid()),
    };
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(PipelineError::validation("Invalid URL format")),
    }
}

pub fn validate_language(language: &str) -> Result<(), PipelineError> {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::validation("Language cannot be empty"));
    }
    let length = trimmed.chars().count();
    if length < MIN_LANGUAGE_LENGTH {
        return Err(PipelineError::validation("Language name is too short"));
    }
    if length > MAX_LANGUAGE_LENGTH {
        return Err(PipelineError::validation("Language name is too long"));
    }
    if trimmed.contains(['<', '>', '"', '\'']) {
        return Err(PipelineError::validation(
            "Language name contains invalid characters",
        ));
    }
    Ok(())
}

pub fn validate_custom_prompt(prompt: &str) -> Result<(), PipelineError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::validation("Custom prompt cannot be empty"));
    }
    if trimmed.chars().count() < MIN_PROMPT_LENGTH {
        return Err(PipelineError::validation(format!(
            "Custom prompt must be at least {} characters long",
            MIN_PROMPT_LENGTH
        )));
    }
    if prompt.chars().count() > MAX_PROMPT_LENGTH {
        return Err(PipelineError::validation(format!(
            "Custom prompt is too long (maximum {} characters)",
            MAX_PROMPT_LENGTH
        )));
    }
    Ok(())
}

/// Size and type summary for an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub size: u64,
    pub extension: String,
    pub is_text: bool,
    pub is_media: bool,
}

impl FileInfo {
    pub fn size_mb(&self) -> f64 {
        (self.size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }

    /// Rough wall-clock estimate shown before long operations.
    pub fn estimate_processing_time(&self) -> &'static str {
        let mb = self.size as f64 / (1024.0 * 1024.0);
        if self.is_text {
            if mb < 1.0 {
                "~5-10 seconds"
            } else if mb < 5.0 {
                "~10-30 seconds"
            } else {
                "~30-60 seconds"
            }
        } else if self.is_media {
            if mb < 10.0 {
                "~30-60 seconds"
            } else if mb < 50.0 {
                "~1-3 minutes"
            } else {
                "~3-5 minutes"
            }
        } else {
            "Unknown"
        }
    }
}

pub fn file_info(path: &Path) -> Option<FileInfo> {
    let meta = fs::metadata(path).ok()?;
    let extension = extension_of(path);
    Some(FileInfo {
        size: meta.len(),
        is_text: TEXT_EXTENSIONS.contains(&extension.as_str()),
        is_media: MEDIA_EXTENSIONS.contains(&extension.as_str()),
        extension,
    })
}
