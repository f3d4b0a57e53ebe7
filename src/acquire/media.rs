//! Media download.
//!
//! A media URL is classified once into [`MediaUrlKind`]. Video hosts go
//! through yt-dlp (audio only, bounded retries, socket timeout); anything
//! else is streamed to disk over plain HTTP.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use super::AcquireError;
use crate::config::MediaConfig;
use crate::lifecycle::{run_command, CancelToken};

/// Block size for streamed downloads.
pub const DOWNLOAD_BLOCK_SIZE: usize = 8192;

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "webm"];

/// How a media URL is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaUrlKind {
    /// Video hosting site handled by yt-dlp.
    ShortVideoHost,
    /// Direct link fetched with an HTTP GET.
    GenericHttp,
}

impl MediaUrlKind {
    /// Classify by hostname; subdomains of a video host count as that host.
    pub fn classify(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let is_video_host = VIDEO_HOSTS
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{}", h)));
        if is_video_host {
            MediaUrlKind::ShortVideoHost
        } else {
            MediaUrlKind::GenericHttp
        }
    }
}

/// Downloads the audio of a media URL into `dest_dir`.
///
/// Returns the path of the downloaded file inside `dest_dir`.
pub trait MediaDownloader: Send + Sync {
    fn download(
        &self,
        url: &Url,
        kind: MediaUrlKind,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<PathBuf, AcquireError>;
}

/// Routes each [`MediaUrlKind`] to its strategy.
pub struct DefaultMediaDownloader {
    ytdlp: YtDlpDownloader,
    http: HttpMediaDownloader,
}

impl DefaultMediaDownloader {
    pub fn new(config: &MediaConfig) -> Result<Self, AcquireError> {
        Ok(Self {
            ytdlp: YtDlpDownloader::new(config),
            http: HttpMediaDownloader::new(config)?,
        })
    }
}

impl MediaDownloader for DefaultMediaDownloader {
    fn download(
        &self,
        url: &Url,
        kind: MediaUrlKind,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<PathBuf, AcquireError> {
        match kind {
            MediaUrlKind::ShortVideoHost => self.ytdlp.download(url, dest_dir, cancel),
            MediaUrlKind::GenericHttp => self.http.download(url, dest_dir, cancel),
        }
    }
}

/// yt-dlp audio extraction.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    command: String,
    retries: u32,
    socket_timeout: Duration,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            command: config.ytdlp_command.clone(),
            retries: config.download_retries,
            socket_timeout: Duration::from_secs(config.socket_timeout_secs),
            timeout: Duration::from_secs(config.download_timeout_secs),
        }
    }

    fn build_command(&self, url: &Url, dest_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(["--format", "bestaudio[ext=m4a]/bestaudio/best"])
            .args(["--extract-audio", "--audio-format", "mp3", "--audio-quality", "192K"])
            .arg("--retries")
            .arg(self.retries.to_string())
            .arg("--socket-timeout")
            .arg(self.socket_timeout.as_secs().to_string())
            .args(["--quiet", "--no-warnings", "--no-progress"])
            .arg("--output")
            .arg(dest_dir.join("%(title)s.%(ext)s"))
            .arg(url.as_str());
        cmd
    }

    pub fn download(
        &self,
        url: &Url,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<PathBuf, AcquireError> {
        info!("Downloading audio with {} from {}", self.command, url);
        let mut cmd = self.build_command(url, dest_dir);
        run_command(&mut cmd, None, self.timeout, cancel)?;
        find_audio_file(dest_dir)?.ok_or(AcquireError::NoAudio)
    }
}

/// First audio file in `dir` by name, if any.
pub(crate) fn find_audio_file(dir: &Path) -> Result<Option<PathBuf>, AcquireError> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .map(|e| AUDIO_EXTENSIONS.contains(&e.to_string_lossy().to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Streaming HTTP download for direct media links.
pub struct HttpMediaDownloader {
    client: Client,
}

impl HttpMediaDownloader {
    pub fn new(config: &MediaConfig) -> Result<Self, AcquireError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.socket_timeout_secs))
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn download(
        &self,
        url: &Url,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> Result<PathBuf, AcquireError> {
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }

        let target = dest_dir.join(format!("audio{}", media_extension(url)));
        info!("Downloading media from {}", url);
        let mut response = self.client.get(url.as_str()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::HttpStatus(status.as_u16()));
        }

        let mut file = File::create(&target)?;
        let written = copy_in_blocks(&mut response, &mut file, cancel)?;
        debug!("Wrote {} bytes to {}", written, target.display());
        Ok(target)
    }
}

/// Copy `reader` to `writer` in fixed-size blocks, checking `cancel` between blocks.
pub(crate) fn copy_in_blocks<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    cancel: &CancelToken,
) -> Result<u64, AcquireError> {
    let mut buf = [0u8; DOWNLOAD_BLOCK_SIZE];
    let mut total = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

/// Extension of the URL's last path segment with a dot, or `.mp3`.
pub(crate) fn media_extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".mp3".to_string())
}
