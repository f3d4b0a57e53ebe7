//! Integration tests for temp resource tracking and shutdown

use std::sync::Arc;

use tempfile::TempDir;

use sume::{ShutdownGuard, TempRegistry};

#[test]
fn released_paths_leave_the_live_set_and_disk() {
    let temp = TempDir::new().unwrap();
    let registry = TempRegistry::with_root(temp.path());
    let dir = registry.create_temp_dir().unwrap();
    let file = registry.create_temp_file(".wav").unwrap();
    std::fs::write(dir.path.join("inner.txt"), "x").unwrap();
    assert_eq!(registry.live_count(), 2);

    assert!(registry.release(&dir.path));
    assert!(registry.release(&file.path));
    assert!(!dir.path.exists());
    assert!(!file.path.exists());
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn release_is_idempotent_and_tolerates_missing_paths() {
    let temp = TempDir::new().unwrap();
    let registry = TempRegistry::with_root(temp.path());
    let file = registry.create_temp_file(".mp3").unwrap();
    std::fs::remove_file(&file.path).unwrap();

    assert!(registry.release(&file.path));
    assert!(!registry.release(&file.path));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn scoped_guard_releases_on_early_return() {
    let temp = TempDir::new().unwrap();
    let registry = TempRegistry::with_root(temp.path());

    fn work(registry: &TempRegistry) -> Result<(), String> {
        let guard = registry.scoped_dir().map_err(|e| e.to_string())?;
        std::fs::write(guard.path().join("partial.bin"), b"half").unwrap();
        Err("download failed".to_string())
    }

    assert!(work(&registry).is_err());
    assert_eq!(registry.live_count(), 0);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn shutdown_guard_reconciles_leaks() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(TempRegistry::with_root(temp.path()));
    let leaked = registry.create_temp_dir().unwrap();

    let guard = ShutdownGuard::new(registry.clone());
    assert!(!guard.should_terminate());
    assert_eq!(guard.finish(), 1);
    assert!(!leaked.path.exists());
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn cancel_token_is_shared_by_clones() {
    let temp = TempDir::new().unwrap();
    let guard = ShutdownGuard::new(Arc::new(TempRegistry::with_root(temp.path())));
    let token = guard.token();
    token.cancel();
    assert!(guard.token().is_cancelled());
    assert!(guard.should_terminate());
}
