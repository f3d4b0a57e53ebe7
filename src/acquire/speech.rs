//! Audio normalization and speech recognition.
//!
//! Input media is converted to a mono waveform at a fixed sample rate with
//! ffmpeg, then transcribed with the whisper CLI.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::AcquireError;
use crate::config::MediaConfig;
use crate::lifecycle::{run_command, CancelToken, TempRegistry};

/// Converts any audio or video file into a mono WAV at a fixed rate.
pub trait AudioConverter: Send + Sync {
    fn to_waveform(&self, input: &Path, output: &Path, cancel: &CancelToken)
        -> Result<(), AcquireError>;
}

/// Transcribes a mono WAV file. An empty string means nothing was recognized.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, wav: &Path, cancel: &CancelToken) -> Result<String, AcquireError>;
}

#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    command: String,
    sample_rate: u32,
    timeout: Duration,
}

impl FfmpegConverter {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            command: config.ffmpeg_command.clone(),
            sample_rate: config.sample_rate,
            timeout: Duration::from_secs(config.transcribe_timeout_secs),
        }
    }

    fn build_command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-ac", "1", "-ar"])
            .arg(self.sample_rate.to_string())
            .args(["-f", "wav"])
            .arg(output);
        cmd
    }
}

impl AudioConverter for FfmpegConverter {
    fn to_waveform(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<(), AcquireError> {
        let mut cmd = self.build_command(input, output);
        run_command(&mut cmd, None, self.timeout, cancel)?;
        Ok(())
    }
}

/// whisper CLI writing a `.txt` transcript into a scoped temp directory.
pub struct WhisperRecognizer {
    command: String,
    model: String,
    timeout: Duration,
    registry: Arc<TempRegistry>,
}

impl WhisperRecognizer {
    pub fn new(config: &MediaConfig, registry: Arc<TempRegistry>) -> Self {
        Self {
            command: config.whisper_command.clone(),
            model: config.whisper_model.clone(),
            timeout: Duration::from_secs(config.transcribe_timeout_secs),
            registry,
        }
    }

    fn build_command(&self, wav: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg(wav)
            .arg("--model")
            .arg(&self.model)
            .args(["--output_format", "txt", "--verbose", "False", "--fp16", "False"])
            .arg("--output_dir")
            .arg(out_dir);
        cmd
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, wav: &Path, cancel: &CancelToken) -> Result<String, AcquireError> {
        let out_dir = self
            .registry
            .scoped_dir()
            .map_err(|e| AcquireError::Resource(e.to_string()))?;

        info!("Transcribing {} with whisper model {}", wav.display(), self.model);
        let mut cmd = self.build_command(wav, out_dir.path());
        run_command(&mut cmd, None, self.timeout, cancel)?;

        let stem = wav
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let transcript = out_dir.path().join(format!("{}.txt", stem));
        let text = fs::read_to_string(&transcript)?;
        Ok(text.trim().to_string())
    }
}
