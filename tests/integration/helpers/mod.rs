//! Test helper utilities: in-memory stand-ins for every collaborator.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use url::Url;

use sume::acquire::{
    AcquireError, AudioConverter, DocumentExtractor, DocumentKind, FileDocumentExtractor,
    MediaDownloader, MediaUrlKind, SpeechRecognizer, WebpageExtractor,
};
use sume::model::{ModelError, ModelResult};
use sume::{
    CancelToken, Collaborators, Config, GenerativeModel, SourceBackends, Summarizer, TempRegistry,
};

pub const ARTICLE: &str = "A long article about renewable energy: solar and wind capacity \
    grew faster than any other source last year, while storage costs kept falling.";

type Reply = Box<dyn Fn(&str) -> ModelResult<String> + Send + Sync>;

/// Model that counts calls and answers through a closure.
pub struct CountingModel {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    reply: Reply,
}

impl CountingModel {
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&str) -> ModelResult<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        })
    }

    /// Replies with a short description of the prompt's last line.
    pub fn echo() -> Arc<Self> {
        Self::new(|prompt| {
            let last = prompt.lines().last().unwrap_or_default();
            Ok(format!("summary<{}>", last))
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| {
            Err(ModelError::ExitCode {
                code: 1,
                stderr: "backend exploded".to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl GenerativeModel for CountingModel {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn generate(&self, prompt: &str, _: Duration, _: &CancelToken) -> ModelResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)(prompt)
    }
}

/// Real file extraction, counted.
#[derive(Default)]
pub struct CountingDocuments {
    pub calls: AtomicUsize,
}

impl DocumentExtractor for CountingDocuments {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<String, AcquireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FileDocumentExtractor.extract(path, kind)
    }
}

/// Web extractor returning a fixed page text, or `NoContent` when `None`.
pub struct StaticWeb {
    pub text: Option<String>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl StaticWeb {
    pub fn new(text: Option<&str>) -> Self {
        Self {
            text: text.map(str::to_string),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl WebpageExtractor for StaticWeb {
    fn extract(&self, url: &Url, _: &CancelToken) -> Result<String, AcquireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(url.to_string());
        self.text.clone().ok_or(AcquireError::NoContent)
    }
}

/// What the mock downloader does.
#[derive(Clone)]
pub enum Download {
    /// Write an audio file into the destination directory
    Audio,
    /// Fail with an HTTP status
    Status(u16),
    /// Write a partial file, then panic
    Panic,
    /// Trip the cancel token mid-download
    Cancel,
}

pub struct MockDownloader {
    pub behavior: Download,
    pub kinds: Mutex<Vec<MediaUrlKind>>,
    pub dirs: Mutex<Vec<PathBuf>>,
}

impl MockDownloader {
    pub fn new(behavior: Download) -> Self {
        Self {
            behavior,
            kinds: Mutex::new(Vec::new()),
            dirs: Mutex::new(Vec::new()),
        }
    }
}

impl MediaDownloader for MockDownloader {
    fn download(
        &self,
        _url: &Url,
        kind: MediaUrlKind,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<PathBuf, AcquireError> {
        self.kinds.lock().unwrap().push(kind);
        self.dirs.lock().unwrap().push(dest_dir.to_path_buf());
        match self.behavior {
            Download::Audio => {
                let path = dest_dir.join("audio.mp3");
                fs::write(&path, b"ID3 fake audio")?;
                Ok(path)
            }
            Download::Status(code) => Err(AcquireError::HttpStatus(code)),
            Download::Panic => {
                fs::write(dest_dir.join("partial.mp3"), b"ID3")?;
                panic!("downloader crashed mid-transfer");
            }
            Download::Cancel => {
                fs::write(dest_dir.join("partial.mp3"), b"ID3")?;
                cancel.cancel();
                Err(AcquireError::Cancelled)
            }
        }
    }
}

/// Writes a placeholder waveform and remembers where.
#[derive(Default)]
pub struct MockConverter {
    pub outputs: Mutex<Vec<PathBuf>>,
}

impl AudioConverter for MockConverter {
    fn to_waveform(&self, input: &Path, output: &Path, _: &CancelToken) -> Result<(), AcquireError> {
        if !input.exists() {
            return Err(AcquireError::Format(format!("missing input {}", input.display())));
        }
        fs::write(output, b"RIFF fake wav")?;
        self.outputs.lock().unwrap().push(output.to_path_buf());
        Ok(())
    }
}

/// Fixed transcript; an empty one means nothing was recognized.
pub struct MockRecognizer {
    pub transcript: String,
    pub calls: AtomicUsize,
    pub panics: bool,
}

impl MockRecognizer {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
            panics: false,
        }
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn transcribe(&self, wav: &Path, _: &CancelToken) -> Result<String, AcquireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(wav.exists(), "waveform must exist while recognizing");
        if self.panics {
            panic!("recognizer crashed on {}", wav.display());
        }
        Ok(self.transcript.clone())
    }
}

/// Everything a test needs to drive a [`Summarizer`] and inspect the mocks.
pub struct Harness {
    pub summarizer: Summarizer,
    pub model: Arc<CountingModel>,
    pub documents: Arc<CountingDocuments>,
    pub web: Arc<StaticWeb>,
    pub downloader: Arc<MockDownloader>,
    pub converter: Arc<MockConverter>,
    pub recognizer: Arc<MockRecognizer>,
    pub registry: Arc<TempRegistry>,
    pub cancel: CancelToken,
    _temp: TempDir,
}

pub struct HarnessBuilder {
    config: Config,
    model: Arc<CountingModel>,
    web: StaticWeb,
    download: Download,
    transcript: String,
    recognizer_panics: bool,
}

impl HarnessBuilder {
    pub fn model(mut self, model: Arc<CountingModel>) -> Self {
        self.model = model;
        self
    }

    pub fn web(mut self, text: Option<&str>) -> Self {
        self.web = StaticWeb::new(text);
        self
    }

    pub fn download(mut self, behavior: Download) -> Self {
        self.download = behavior;
        self
    }

    pub fn transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    pub fn recognizer_panics(mut self) -> Self {
        self.recognizer_panics = true;
        self
    }

    pub fn config(mut self, edit: impl FnOnce(&mut Config)) -> Self {
        edit(&mut self.config);
        self
    }

    pub fn build(self) -> Harness {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let registry = Arc::new(TempRegistry::with_root(temp.path().join("scratch")));
        let cancel = CancelToken::new();

        let documents = Arc::new(CountingDocuments::default());
        let web = Arc::new(self.web);
        let downloader = Arc::new(MockDownloader::new(self.download));
        let converter = Arc::new(MockConverter::default());
        let mut recognizer = MockRecognizer::new(&self.transcript);
        recognizer.panics = self.recognizer_panics;
        let recognizer = Arc::new(recognizer);

        let collaborators = Collaborators {
            model: self.model.clone(),
            sources: SourceBackends {
                documents: documents.clone(),
                web: web.clone(),
                downloader: downloader.clone(),
                converter: converter.clone(),
                recognizer: recognizer.clone(),
            },
        };
        let summarizer = Summarizer::new(&self.config, collaborators, registry.clone(), cancel.clone());

        Harness {
            summarizer,
            model: self.model,
            documents,
            web,
            downloader,
            converter,
            recognizer,
            registry,
            cancel,
            _temp: temp,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            config: Config::default(),
            model: CountingModel::echo(),
            web: StaticWeb::new(Some("Main article text about city cycling lanes.")),
            download: Download::Audio,
            transcript: "the speaker explains how heat pumps work in winter".to_string(),
            recognizer_panics: false,
        }
    }

    pub fn new() -> Harness {
        Self::builder().build()
    }

    /// Scratch directory for input files.
    pub fn dir(&self) -> &Path {
        self._temp.path()
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir().join(name);
        fs::write(&path, contents).expect("Failed to write input file");
        path
    }

    /// Entries left under the temp root.
    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.registry.root()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
