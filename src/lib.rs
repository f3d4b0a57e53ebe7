//! Sume Library
//!
//! Summarize, extend and translate content from text, documents, web pages
//! and media, with every expensive call memoized.

pub mod acquire;
pub mod cache;
pub mod config;
pub mod languages;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod validation;

pub use acquire::{SourceBackends, SourceDescriptor, SourceKind};
pub use cache::{CacheStats, Fingerprint, MemoCache};
pub use config::Config;
pub use lifecycle::{CancelToken, ShutdownGuard, TempRegistry};
pub use model::{GenerativeModel, ModelKind};
pub use outcome::{ErrorKind, PipelineError, PipelineResult, WARNING_MARKER};
pub use pipeline::{Collaborators, ExtendMode, PipelineOutput, PipelineRequest, Summarizer};
