//! Summarizer facade for the whole acquire → summarize → extend → translate
//! chain.
//!
//! # Workflow
//!
//! 1. Validate the raw input
//! 2. Acquire plain text from the source
//! 3. Summarize (chunked for documents)
//! 4. Optionally extend, in detail or with a focus
//! 5. Optionally translate the latest stage output
//!
//! Any stage may fail. A failure is a warning-marked result, and every later
//! stage hands it through unchanged.

pub mod chunk;
pub mod prompt;
mod transform;

pub use chunk::{chunk_count, chunk_text, Chunks, ContentChunk, DEFAULT_MAX_WORDS};
pub use prompt::TransformOp;
pub use transform::{TransformPipeline, CHUNK_SEPARATOR};

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::acquire::{Acquirer, SourceBackends, SourceDescriptor};
use crate::cache::{CacheStats, MemoCache};
use crate::config::Config;
use crate::lifecycle::{CancelToken, TempRegistry};
use crate::model::{GenerativeModel, ModelKind};
use crate::outcome::{PipelineError, PipelineResult};
use crate::{languages, validation};

/// Message returned by [`Summarizer::clear_cache`].
pub const CACHE_CLEARED: &str = "Cache cleared successfully!";

/// External collaborators the summarizer drives.
#[derive(Clone)]
pub struct Collaborators {
    pub model: Arc<dyn GenerativeModel>,
    pub sources: SourceBackends,
}

impl Collaborators {
    /// The configured model CLI plus the real acquisition backends.
    pub fn from_config(config: &Config, registry: Arc<TempRegistry>) -> Result<Self> {
        let kind = ModelKind::from_config(&config.model).map_err(|e| anyhow!(e))?;
        let sources = SourceBackends::from_config(config, registry)?;
        Ok(Self {
            model: kind.create_backend(config.model.extra_args.clone()),
            sources,
        })
    }
}

/// How the summary is extended, if at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtendMode {
    #[default]
    None,
    Detailed,
    Focus(String),
}

/// One end-to-end request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub source: SourceDescriptor,
    pub extend: ExtendMode,
    /// Target language for the final output
    pub translate: Option<String>,
}

impl PipelineRequest {
    pub fn new(source: SourceDescriptor) -> Self {
        Self {
            source,
            extend: ExtendMode::None,
            translate: None,
        }
    }

    pub fn extend(mut self, mode: ExtendMode) -> Self {
        self.extend = mode;
        self
    }

    pub fn translate(mut self, language: impl Into<String>) -> Self {
        self.translate = Some(language.into());
        self
    }
}

/// Per-stage outputs of a request. Stages that did not run are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub summary: PipelineResult,
    pub extended: Option<PipelineResult>,
    pub translated: Option<PipelineResult>,
}

impl PipelineOutput {
    /// The delivered result: the last stage that ran.
    pub fn delivered(&self) -> &PipelineResult {
        self.translated
            .as_ref()
            .or(self.extended.as_ref())
            .unwrap_or(&self.summary)
    }

    pub fn is_warning(&self) -> bool {
        self.delivered().is_warning()
    }
}

/// Entry points for every pipeline operation, sharing one cache.
pub struct Summarizer {
    acquirer: Acquirer,
    transforms: TransformPipeline,
    cache: Arc<MemoCache<PipelineResult>>,
    registry: Arc<TempRegistry>,
}

impl Summarizer {
    pub fn new(
        config: &Config,
        collaborators: Collaborators,
        registry: Arc<TempRegistry>,
        cancel: CancelToken,
    ) -> Self {
        let cache = Arc::new(MemoCache::new(&config.cache));
        let acquirer = Acquirer::new(
            collaborators.sources,
            registry.clone(),
            cache.clone(),
            cancel.clone(),
        );
        let transforms = TransformPipeline::new(
            collaborators.model,
            cache.clone(),
            config.model.timeout(),
            cancel,
        )
        .with_chunking(config.chunking.max_words, config.chunking.workers);

        Self {
            acquirer,
            transforms,
            cache,
            registry,
        }
    }

    pub fn acquire(&self, source: &SourceDescriptor) -> PipelineResult {
        self.acquirer.acquire(source)
    }

    pub fn summarize(&self, text: &str) -> PipelineResult {
        pass_or(text, || {
            validation::validate_text(text).map_err(PipelineResult::from)?;
            Ok(self.transforms.summarize(text))
        })
    }

    pub fn summarize_chunked(&self, text: &str) -> PipelineResult {
        pass_or(text, || Ok(self.transforms.summarize_chunked(text)))
    }

    /// Extract a document and summarize it chunk by chunk.
    pub fn summarize_file(&self, path: &Path) -> PipelineResult {
        self.acquire(&SourceDescriptor::Document(path.to_path_buf()))
            .and_then(|text| self.transforms.summarize_chunked(text))
    }

    pub fn extend(&self, summary: &str) -> PipelineResult {
        pass_or(summary, || {
            require_summary(summary)?;
            Ok(self.transforms.extend(summary))
        })
    }

    pub fn extend_custom(&self, summary: &str, focus: &str) -> PipelineResult {
        pass_or(summary, || {
            require_summary(summary)?;
            if focus.trim().is_empty() {
                return Err(PipelineError::validation(
                    "Please enter specific details to focus on.",
                )
                .into());
            }
            validation::validate_custom_prompt(focus).map_err(PipelineResult::from)?;
            Ok(self.transforms.extend_custom(summary, focus.trim()))
        })
    }

    pub fn translate(&self, text: &str, language: &str) -> PipelineResult {
        pass_or(text, || {
            require_summary(text)?;
            validation::validate_language(language).map_err(PipelineResult::from)?;
            let language = match languages::canonical_name(language) {
                Some(name) => name,
                None => {
                    debug!("'{}' is not in the language list", language.trim());
                    language.trim()
                }
            };
            Ok(self.transforms.translate(text, language))
        })
    }

    /// Run a full request. Documents are summarized chunk by chunk; every
    /// other source goes through a single summarize call.
    pub fn run(&self, request: &PipelineRequest) -> PipelineOutput {
        info!("Running {:?} request", request.source.kind());
        let acquired = self.acquire(&request.source);
        let summary = match request.source {
            SourceDescriptor::Document(_) => {
                acquired.and_then(|text| self.transforms.summarize_chunked(text))
            }
            _ => acquired.and_then(|text| self.transforms.summarize(text)),
        };

        let extended = match &request.extend {
            ExtendMode::None => None,
            ExtendMode::Detailed => Some(self.extend(summary.as_str())),
            ExtendMode::Focus(focus) => Some(self.extend_custom(summary.as_str(), focus)),
        };

        let translated = request.translate.as_ref().map(|language| {
            let latest = extended.as_ref().unwrap_or(&summary);
            self.translate(latest.as_str(), language)
        });

        PipelineOutput {
            summary,
            extended,
            translated,
        }
    }

    /// Drop every cache entry.
    pub fn clear_cache(&self) -> &'static str {
        self.cache.clear();
        CACHE_CLEARED
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_size_message(&self) -> String {
        format!("Cache size: {} items", self.cache.len())
    }

    pub fn registry(&self) -> &Arc<TempRegistry> {
        &self.registry
    }

    pub fn model_name(&self) -> &'static str {
        self.transforms.model_name()
    }
}

/// Pass warnings through, otherwise run the stage.
fn pass_or<F>(input: &str, stage: F) -> PipelineResult
where
    F: FnOnce() -> std::result::Result<PipelineResult, PipelineResult>,
{
    if crate::outcome::is_warning(input) {
        return PipelineResult::text(input);
    }
    match stage() {
        Ok(result) | Err(result) => result,
    }
}

fn require_summary(summary: &str) -> std::result::Result<(), PipelineResult> {
    if summary.trim().is_empty() {
        return Err(PipelineError::validation("No summary to process.").into());
    }
    Ok(())
}
