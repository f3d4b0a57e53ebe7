//! Model-backed text transforms.
//!
//! Every operation renders its prompt template, makes one model call and is
//! memoized under its operation name plus arguments. Chunked summarization
//! fans the chunks out over a dedicated rayon pool and joins the partial
//! summaries in chunk order.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::chunk::{chunk_text, ContentChunk};
use super::prompt::{self, TransformOp};
use crate::cache::{Fingerprint, MemoCache};
use crate::lifecycle::CancelToken;
use crate::model::{GenerativeModel, ModelError};
use crate::outcome::{PipelineError, PipelineResult};

/// Separator between per-chunk summaries.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Runs the summarize, extend and translate transforms against one model.
pub struct TransformPipeline {
    model: Arc<dyn GenerativeModel>,
    cache: Arc<MemoCache<PipelineResult>>,
    timeout: Duration,
    cancel: CancelToken,
    max_words: usize,
    workers: usize,
}

impl TransformPipeline {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        cache: Arc<MemoCache<PipelineResult>>,
        timeout: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            model,
            cache,
            timeout,
            cancel,
            max_words: super::chunk::DEFAULT_MAX_WORDS,
            workers: 1,
        }
    }

    /// Set the chunk size and worker count used by [`Self::summarize_chunked`].
    pub fn with_chunking(mut self, max_words: usize, workers: usize) -> Self {
        self.max_words = max_words.max(1);
        self.workers = workers.max(1);
        self
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn summarize(&self, text: &str) -> PipelineResult {
        let op = TransformOp::Summarize;
        let key = Fingerprint::builder(op.name()).arg(text).finish();
        self.cache
            .memoize(key, || self.generate(op, &prompt::summarize_prompt(text)))
    }

    pub fn extend(&self, summary: &str) -> PipelineResult {
        let op = TransformOp::Extend;
        let key = Fingerprint::builder(op.name()).arg(summary).finish();
        self.cache
            .memoize(key, || self.generate(op, &prompt::extend_prompt(summary)))
    }

    pub fn extend_custom(&self, summary: &str, focus: &str) -> PipelineResult {
        let op = TransformOp::ExtendCustom;
        let key = Fingerprint::builder(op.name())
            .arg(summary)
            .arg(focus)
            .finish();
        self.cache.memoize(key, || {
            self.generate(op, &prompt::extend_custom_prompt(summary, focus))
        })
    }

    pub fn translate(&self, text: &str, language: &str) -> PipelineResult {
        let op = TransformOp::Translate;
        let key = Fingerprint::builder(op.name())
            .arg(text)
            .arg(language)
            .finish();
        self.cache
            .memoize(key, || self.generate(op, &prompt::translate_prompt(text, language)))
    }

    /// Summarize each chunk independently and join the partial summaries.
    ///
    /// Failed chunks are skipped. The result is a failure only when no chunk
    /// produced a summary. There is no second pass over the joined text.
    pub fn summarize_chunked(&self, text: &str) -> PipelineResult {
        let key = Fingerprint::builder("summarize_chunked")
            .arg(text)
            .named("max_words", &self.max_words)
            .finish();
        self.cache.memoize(key, || {
            let chunks: Vec<ContentChunk> = chunk_text(text, self.max_words).collect();
            debug!(
                "Summarizing {} chunk(s) with {} worker(s)",
                chunks.len(),
                self.workers
            );

            let results = self.summarize_chunks(chunks);
            if self.cancel.is_cancelled() {
                return Err(PipelineError::cancelled());
            }

            let summaries: Vec<String> = results.into_iter().flatten().collect();
            if summaries.is_empty() {
                return Err(PipelineError::model(TransformOp::Summarize.empty_message()));
            }
            Ok(summaries.join(CHUNK_SEPARATOR))
        })
    }

    /// Per-chunk summaries in chunk order, `None` for a failed chunk.
    fn summarize_chunks(&self, chunks: Vec<ContentChunk>) -> Vec<Option<String>> {
        if chunks.len() <= 1 || self.workers <= 1 {
            return chunks.iter().map(|c| self.summarize_chunk(c)).collect();
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers.min(chunks.len()))
            .thread_name(|i| format!("sume-chunk-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Failed to create thread pool: {}. Processing sequentially.", e);
                return chunks.iter().map(|c| self.summarize_chunk(c)).collect();
            }
        };

        // par_iter over a Vec is indexed, so collect keeps chunk order.
        pool.install(|| chunks.par_iter().map(|c| self.summarize_chunk(c)).collect())
    }

    fn summarize_chunk(&self, chunk: &ContentChunk) -> Option<String> {
        let op = TransformOp::Summarize;
        match self.generate(op, &prompt::summarize_prompt(&chunk.text)) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Chunk {} ({} words) failed: {}", chunk.index, chunk.word_count, e);
                None
            }
        }
    }

    /// One model call, with the model's failure mapped into the op's message.
    fn generate(&self, op: TransformOp, prompt: &str) -> Result<String, PipelineError> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::cancelled());
        }
        debug!("{} via {} ({} prompt bytes)", op.name(), self.model.name(), prompt.len());

        match self.model.generate(prompt, self.timeout, &self.cancel) {
            Ok(text) if text.trim().is_empty() => Err(PipelineError::model(op.empty_message())),
            Ok(text) => Ok(text.trim().to_string()),
            Err(ModelError::Cancelled) => Err(PipelineError::cancelled()),
            Err(ModelError::EmptyResponse) => Err(PipelineError::model(op.empty_message())),
            Err(e) => Err(PipelineError::model(format!("{}: {}", op.error_prefix(), e))),
        }
    }
}
