//! Cancellation and shutdown handling.
//!
//! Detects termination conditions and trips a shared [`CancelToken`]:
//! - SIGINT (Ctrl+C) via ctrlc handler
//! - SIGHUP (terminal hangup) via signal_hook
//! - Parent process death (ppid changed since startup)
//!
//! Every blocking wait in the crate polls the token, so in-flight work
//! unwinds through its scoped temp guards. The binary then calls
//! [`ShutdownGuard::finish`] to release whatever was left.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
#[cfg(unix)]
use std::time::Duration;

use super::TempRegistry;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }
}

/// Process-level safety net: signal handlers plus final temp cleanup.
pub struct ShutdownGuard {
    token: CancelToken,
    registry: Arc<TempRegistry>,
    #[cfg(unix)]
    initial_ppid: u32,
}

impl ShutdownGuard {
    /// Snapshot the current parent PID for later orphan detection.
    pub fn new(registry: Arc<TempRegistry>) -> Self {
        Self {
            token: CancelToken::new(),
            registry,
            #[cfg(unix)]
            initial_ppid: unsafe { libc::getppid() as u32 },
        }
    }

    /// Register SIGINT (Ctrl+C) and SIGHUP (terminal hangup) handlers.
    ///
    /// Both trip the same token. Safe to call more than once; duplicate
    /// registrations are ignored.
    pub fn register_signal_handlers(&self) {
        let token = self.token.clone();
        ctrlc::set_handler(move || {
            token.cancel();
        })
        .ok(); // Ignore if handler already set

        #[cfg(unix)]
        {
            use signal_hook::flag::register;
            let _ = register(libc::SIGHUP, self.token.flag());
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn registry(&self) -> Arc<TempRegistry> {
        self.registry.clone()
    }

    /// Whether work should stop: signal received or parent gone.
    pub fn should_terminate(&self) -> bool {
        if self.is_orphaned() {
            self.token.cancel();
        }
        self.token.is_cancelled()
    }

    /// Trip the token from a background thread once the parent dies.
    ///
    /// Polls every 500ms and exits after cancelling.
    pub fn watch_parent(&self) {
        #[cfg(unix)]
        {
            let token = self.token.clone();
            let initial_ppid = self.initial_ppid;
            std::thread::spawn(move || {
                while !token.is_cancelled() {
                    if parent_changed(initial_ppid) {
                        tracing::warn!("Parent process exited, cancelling");
                        token.cancel();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(500));
                }
            });
        }
    }

    #[cfg(unix)]
    fn is_orphaned(&self) -> bool {
        parent_changed(self.initial_ppid)
    }

    #[cfg(not(unix))]
    fn is_orphaned(&self) -> bool {
        false
    }

    /// Release every temp path still tracked. Returns how many were removed.
    pub fn finish(&self) -> usize {
        let released = self.registry.release_all();
        if released > 0 {
            tracing::warn!("Removed {} temp paths left behind at shutdown", released);
        }
        released
    }
}

/// Any ppid change means the parent died (reparented to init or a subreaper).
#[cfg(unix)]
fn parent_changed(initial_ppid: u32) -> bool {
    let current_ppid = unsafe { libc::getppid() as u32 };
    current_ppid != initial_ppid
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.finish();
    }
}
