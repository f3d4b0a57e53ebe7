//! Temporary resource lifecycle.
//!
//! Every temp file or directory handed out by [`TempRegistry`] is tracked in
//! a live set until it is released. Scoped use goes through [`TempGuard`],
//! which releases on drop, so early returns and panics still clean up.
//! [`TempRegistry::release_all`] reconciles anything left at shutdown.

pub mod process;
mod shutdown;

pub use process::{command_exists, run_command, ProcessError};
pub use shutdown::{CancelToken, ShutdownGuard};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::outcome::PipelineError;

const NAME_PREFIX: &str = "sume-";

/// What a tracked path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempKind {
    File,
    Directory,
}

/// A tracked temporary path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempResource {
    pub path: PathBuf,
    pub kind: TempKind,
}

/// Creates uniquely named temp files and directories and removes them once.
#[derive(Debug)]
pub struct TempRegistry {
    root: PathBuf,
    live: Mutex<HashMap<PathBuf, TempKind>>,
}

impl Default for TempRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TempRegistry {
    /// Registry rooted at the system temp directory.
    pub fn new() -> Self {
        Self::with_root(std::env::temp_dir())
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            live: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn live_set(&self) -> MutexGuard<'_, HashMap<PathBuf, TempKind>> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn unique_path(&self, suffix: &str) -> PathBuf {
        self.root
            .join(format!("{}{}{}", NAME_PREFIX, Uuid::new_v4().simple(), suffix))
    }

    /// Create and track a fresh directory.
    pub fn create_temp_dir(&self) -> io::Result<TempResource> {
        fs::create_dir_all(&self.root)?;
        let path = self.unique_path("");
        fs::create_dir(&path)?;
        self.track(&path, TempKind::Directory);
        Ok(TempResource {
            path,
            kind: TempKind::Directory,
        })
    }

    /// Create and track an empty file ending in `suffix` (e.g. `".wav"`).
    pub fn create_temp_file(&self, suffix: &str) -> io::Result<TempResource> {
        fs::create_dir_all(&self.root)?;
        let path = self.unique_path(suffix);
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        self.track(&path, TempKind::File);
        Ok(TempResource {
            path,
            kind: TempKind::File,
        })
    }

    fn track(&self, path: &Path, kind: TempKind) {
        debug!("Created temp {:?}: {}", kind, path.display());
        self.live_set().insert(path.to_path_buf(), kind);
    }

    /// Remove a tracked path. Untracked or already released paths are a
    /// no-op. Removal failures are logged, never returned.
    ///
    /// Returns whether the path was still tracked.
    pub fn release(&self, path: &Path) -> bool {
        let kind = match self.live_set().remove(path) {
            Some(kind) => kind,
            None => return false,
        };

        let result = match kind {
            TempKind::Directory => fs::remove_dir_all(path),
            TempKind::File => fs::remove_file(path),
        };
        match result {
            Ok(()) => debug!("Released temp {:?}: {}", kind, path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp path {}: {}", path.display(), e),
        }
        true
    }

    /// Release everything still tracked. Returns how many paths were released.
    pub fn release_all(&self) -> usize {
        let paths: Vec<PathBuf> = self.live_set().keys().cloned().collect();
        let released = paths.iter().filter(|p| self.release(p)).count();
        if released > 0 {
            debug!("Released {} leftover temp paths", released);
        }
        released
    }

    pub fn live(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.live_set().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn live_count(&self) -> usize {
        self.live_set().len()
    }

    /// Scoped temp directory, released when the guard drops.
    pub fn scoped_dir(&self) -> Result<TempGuard<'_>, PipelineError> {
        let resource = self
            .create_temp_dir()
            .map_err(|e| PipelineError::resource(format!("Could not create temp directory: {}", e)))?;
        Ok(TempGuard {
            registry: self,
            resource,
        })
    }

    /// Scoped temp file, released when the guard drops.
    pub fn scoped_file(&self, suffix: &str) -> Result<TempGuard<'_>, PipelineError> {
        let resource = self
            .create_temp_file(suffix)
            .map_err(|e| PipelineError::resource(format!("Could not create temp file: {}", e)))?;
        Ok(TempGuard {
            registry: self,
            resource,
        })
    }
}

/// Releases its resource on drop.
#[derive(Debug)]
pub struct TempGuard<'a> {
    registry: &'a TempRegistry,
    resource: TempResource,
}

impl TempGuard<'_> {
    pub fn path(&self) -> &Path {
        &self.resource.path
    }

    pub fn kind(&self) -> TempKind {
        self.resource.kind
    }
}

impl Drop for TempGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.resource.path);
    }
}
