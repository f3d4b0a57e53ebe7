//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Generative model backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Backend CLI to drive: "gemini" or "claude"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Timeout per model call in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    /// Extra CLI arguments passed to the backend before its fixed flags
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_backend() -> String {
    "gemini".to_string()
}

fn default_model_timeout() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            timeout_secs: default_model_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Memoization cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Time-to-live for every entry in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of live entries
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Document chunking settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Parallel workers for per-chunk summarization
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_max_words() -> usize {
    1000
}

fn default_workers() -> usize {
    4
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            workers: default_workers(),
        }
    }
}

/// Media download and transcription settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaConfig {
    #[serde(default = "default_ytdlp")]
    pub ytdlp_command: String,
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_command: String,
    #[serde(default = "default_whisper")]
    pub whisper_command: String,
    /// Whisper model name
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Retry count passed to yt-dlp
    #[serde(default = "default_retries")]
    pub download_retries: u32,
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_secs: u64,
    /// Overall limit for one download
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
    /// Overall limit for conversion plus recognition
    #[serde(default = "default_transcribe_timeout")]
    pub transcribe_timeout_secs: u64,
}

fn default_ytdlp() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_whisper() -> String {
    "whisper".to_string()
}

fn default_whisper_model() -> String {
    "base".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_retries() -> u32 {
    3
}

fn default_socket_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    600
}

fn default_transcribe_timeout() -> u64 {
    1800
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_command: default_ytdlp(),
            ffmpeg_command: default_ffmpeg(),
            whisper_command: default_whisper(),
            whisper_model: default_whisper_model(),
            sample_rate: default_sample_rate(),
            download_retries: default_retries(),
            socket_timeout_secs: default_socket_timeout(),
            download_timeout_secs: default_download_timeout(),
            transcribe_timeout_secs: default_transcribe_timeout(),
        }
    }
}

/// Webpage fetching settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebConfig {
    #[serde(default = "default_web_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_web_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("sume/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_web_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Temp file settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// Root for temp files; the system temp dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Config {
    /// Check value ranges. Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        let valid = ["gemini", "claude"];
        if !valid.contains(&self.model.backend.as_str()) {
            return Err(format!(
                "Unknown model backend '{}'. Valid: {}",
                self.model.backend,
                valid.join(", ")
            ));
        }
        if self.model.timeout_secs == 0 {
            return Err("model.timeout_secs must be > 0".to_string());
        }
        if self.model.timeout_secs > 3600 {
            return Err(format!(
                "model.timeout_secs {} exceeds maximum (3600s)",
                self.model.timeout_secs
            ));
        }
        if self.cache.max_entries == 0 {
            return Err("cache.max_entries must be > 0".to_string());
        }
        if self.chunking.max_words == 0 {
            return Err("chunking.max_words must be > 0".to_string());
        }
        if self.chunking.workers == 0 {
            return Err("chunking.workers must be > 0".to_string());
        }
        if self.chunking.workers > 32 {
            return Err(format!(
                "chunking.workers {} exceeds maximum (32)",
                self.chunking.workers
            ));
        }
        if self.media.sample_rate == 0 {
            return Err("media.sample_rate must be > 0".to_string());
        }
        if self.web.timeout_secs == 0 {
            return Err("web.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}
