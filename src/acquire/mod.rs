//! Content acquisition: turn a source descriptor into plain text.
//!
//! Each branch validates first, then delegates to its collaborator. Every
//! failure is converted into a warning [`PipelineResult`] here; nothing
//! escapes as an error value.
//!
//! Temp paths created for media are held by scoped guards, so they are
//! released on every return path of the acquisition that created them.

mod document;
mod media;
mod speech;
mod web;

pub use document::{clean_markdown, DocumentExtractor, DocumentKind, FileDocumentExtractor};
pub use media::{
    DefaultMediaDownloader, HttpMediaDownloader, MediaDownloader, MediaUrlKind, YtDlpDownloader,
    DOWNLOAD_BLOCK_SIZE,
};
pub use speech::{AudioConverter, FfmpegConverter, SpeechRecognizer, WhisperRecognizer};
pub use web::{main_text, HttpWebpageExtractor, WebpageExtractor};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{Fingerprint, MemoCache};
use crate::config::Config;
use crate::lifecycle::{CancelToken, ProcessError, TempRegistry};
use crate::outcome::{PipelineError, PipelineResult};
use crate::validation;

/// Errors from acquisition collaborators.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Process(#[from] ProcessError),

    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Resource(String),

    #[error("no extractable content")]
    NoContent,

    #[error("No audio file found after download")]
    NoAudio,

    #[error("cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AcquireError::Cancelled | AcquireError::Process(ProcessError::Cancelled)
        )
    }
}

/// Where the content of a request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    DirectText(String),
    Document(PathBuf),
    Webpage(String),
    MediaUrl(String),
    MediaFile(PathBuf),
}

/// Tag of a [`SourceDescriptor`], as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    Text,
    File,
    Web,
    MediaUrl,
    MediaFile,
}

impl SourceDescriptor {
    pub fn new(kind: SourceKind, value: impl Into<String>) -> Self {
        let value = value.into();
        match kind {
            SourceKind::Text => SourceDescriptor::DirectText(value),
            SourceKind::File => SourceDescriptor::Document(PathBuf::from(value)),
            SourceKind::Web => SourceDescriptor::Webpage(value),
            SourceKind::MediaUrl => SourceDescriptor::MediaUrl(value),
            SourceKind::MediaFile => SourceDescriptor::MediaFile(PathBuf::from(value)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::DirectText(_) => SourceKind::Text,
            SourceDescriptor::Document(_) => SourceKind::File,
            SourceDescriptor::Webpage(_) => SourceKind::Web,
            SourceDescriptor::MediaUrl(_) => SourceKind::MediaUrl,
            SourceDescriptor::MediaFile(_) => SourceKind::MediaFile,
        }
    }
}

/// The external collaborators acquisition delegates to.
#[derive(Clone)]
pub struct SourceBackends {
    pub documents: Arc<dyn DocumentExtractor>,
    pub web: Arc<dyn WebpageExtractor>,
    pub downloader: Arc<dyn MediaDownloader>,
    pub converter: Arc<dyn AudioConverter>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
}

impl SourceBackends {
    /// Real collaborators: lopdf/zip, reqwest, yt-dlp, ffmpeg and whisper.
    pub fn from_config(config: &Config, registry: Arc<TempRegistry>) -> Result<Self, AcquireError> {
        let web = HttpWebpageExtractor::new(
            Duration::from_secs(config.web.timeout_secs),
            &config.web.user_agent,
        )?;
        Ok(Self {
            documents: Arc::new(FileDocumentExtractor),
            web: Arc::new(web),
            downloader: Arc::new(DefaultMediaDownloader::new(&config.media)?),
            converter: Arc::new(FfmpegConverter::new(&config.media)),
            recognizer: Arc::new(WhisperRecognizer::new(&config.media, registry)),
        })
    }
}

/// Converts source descriptors into text, memoizing the expensive branches.
pub struct Acquirer {
    backends: SourceBackends,
    registry: Arc<TempRegistry>,
    cache: Arc<MemoCache<PipelineResult>>,
    cancel: CancelToken,
}

impl Acquirer {
    pub fn new(
        backends: SourceBackends,
        registry: Arc<TempRegistry>,
        cache: Arc<MemoCache<PipelineResult>>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            backends,
            registry,
            cache,
            cancel,
        }
    }

    pub fn acquire(&self, source: &SourceDescriptor) -> PipelineResult {
        debug!("Acquiring {:?} source", source.kind());
        match source {
            SourceDescriptor::DirectText(text) => match validation::validate_text(text) {
                Ok(()) => PipelineResult::text(text.clone()),
                Err(e) => e.into(),
            },
            SourceDescriptor::Document(path) => self.acquire_document(path),
            SourceDescriptor::Webpage(url) => self.acquire_webpage(url),
            SourceDescriptor::MediaUrl(url) => self.acquire_media_url(url),
            SourceDescriptor::MediaFile(path) => self.acquire_media_file(path),
        }
    }

    fn acquire_document(&self, path: &Path) -> PipelineResult {
        let kind = match validation::validate_document(path) {
            Ok(kind) => kind,
            Err(e) => return e.into(),
        };

        self.cache.memoize(file_key("extract_text_from_file", path), || {
            let text = self
                .backends
                .documents
                .extract(path, kind)
                .map_err(|e| acquisition(e, |e| format!("Error extracting text: {}", e)))?;
            if text.trim().is_empty() {
                return Err(PipelineError::acquisition(
                    "No text could be extracted from the document.",
                ));
            }
            Ok(text)
        })
    }

    fn acquire_webpage(&self, raw: &str) -> PipelineResult {
        let url = match validation::validate_url(raw) {
            Ok(url) => url,
            Err(e) => return e.into(),
        };

        let key = Fingerprint::builder("extract_article_main_text")
            .arg(url.as_str())
            .finish();
        self.cache.memoize(key, || {
            self.backends
                .web
                .extract(&url, &self.cancel)
                .map_err(|e| match e {
                    AcquireError::NoContent => {
                        PipelineError::acquisition("No main text found in the webpage.")
                    }
                    AcquireError::HttpStatus(_) | AcquireError::Http(_) => acquisition(e, |e| {
                        format!("Could not download content from URL: {}", e)
                    }),
                    other => acquisition(other, |e| format!("Error extracting text: {}", e)),
                })
                .and_then(|text| {
                    if text.trim().is_empty() {
                        Err(PipelineError::acquisition("No main text found in the webpage."))
                    } else {
                        Ok(text)
                    }
                })
        })
    }

    fn acquire_media_url(&self, raw: &str) -> PipelineResult {
        let url = match validation::validate_url(raw) {
            Ok(url) => url,
            Err(e) => return e.into(),
        };
        let kind = MediaUrlKind::classify(&url);

        let key = Fingerprint::builder("transcribe_media_url")
            .arg(url.as_str())
            .finish();
        self.cache.memoize(key, || {
            let dir = self.registry.scoped_dir()?;
            info!("Fetching {:?} media from {}", kind, url);
            let audio = self
                .backends
                .downloader
                .download(&url, kind, dir.path(), &self.cancel)
                .map_err(download_error)?;
            if !audio.exists() {
                return Err(PipelineError::acquisition(format!(
                    "Downloaded file not found: {}",
                    audio.display()
                )));
            }
            self.transcribe(&audio)
        })
    }

    fn acquire_media_file(&self, path: &Path) -> PipelineResult {
        if let Err(e) = validation::validate_media_file(path) {
            return e.into();
        }
        self.cache
            .memoize(file_key("transcribe_media_file", path), || self.transcribe(path))
    }

    /// Normalize to a temp waveform and run speech recognition on it.
    fn transcribe(&self, media: &Path) -> Result<String, PipelineError> {
        let wav = self.registry.scoped_file(".wav")?;
        self.backends
            .converter
            .to_waveform(media, wav.path(), &self.cancel)
            .map_err(recognition_error)?;
        let transcript = self
            .backends
            .recognizer
            .transcribe(wav.path(), &self.cancel)
            .map_err(recognition_error)?;

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(PipelineError::recognition("Could not recognize speech."));
        }
        Ok(transcript.to_string())
    }
}

/// Key on path plus size and mtime so an edited file is re-read.
fn file_key(op: &str, path: &Path) -> Fingerprint {
    let meta = fs::metadata(path).ok();
    let size = meta.as_ref().map(|m| m.len());
    let modified = meta
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| (d.as_secs(), d.subsec_nanos()));
    Fingerprint::builder(op)
        .arg(&path.to_string_lossy())
        .named("size", &size)
        .named("modified", &modified)
        .finish()
}

fn acquisition<F>(error: AcquireError, message: F) -> PipelineError
where
    F: FnOnce(&AcquireError) -> String,
{
    if error.is_cancelled() {
        PipelineError::cancelled()
    } else {
        PipelineError::acquisition(message(&error))
    }
}

fn download_error(error: AcquireError) -> PipelineError {
    match error {
        AcquireError::HttpStatus(code) => PipelineError::acquisition(format!(
            "Could not download media file, HTTP {}",
            code
        )),
        AcquireError::NoAudio => PipelineError::acquisition("No audio file found after download"),
        AcquireError::Resource(message) => PipelineError::resource(message),
        other => acquisition(other, |e| format!("Audio download error: {}", e)),
    }
}

fn recognition_error(error: AcquireError) -> PipelineError {
    match error {
        e if e.is_cancelled() => PipelineError::cancelled(),
        AcquireError::Resource(message) => PipelineError::resource(message),
        other => PipelineError::recognition(format!("Speech-to-text failed: {}", other)),
    }
}
