//! Wait flag: a marker file whose existence means "a session is waiting for input"
//!
//! The file content is the PID of the process that set it. Nothing reads that
//! back; only existence matters. Two processes racing on the file is accepted
//! (last writer wins).

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name of the flag inside the idlebell home directory
const FLAG_FILE_NAME: &str = "waiting";

/// File-backed waiting flag at an explicit path
#[derive(Debug, Clone)]
pub struct WaitFlagStore {
    path: PathBuf,
}

impl WaitFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default flag location (`~/.idlebell/waiting`)
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".idlebell").join(FLAG_FILE_NAME)
            },
            |dirs| dirs.home_dir().join(".idlebell").join(FLAG_FILE_NAME),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create (or overwrite) the flag with our PID
    pub fn set_waiting(&self) -> bool {
        match self.write_pid() {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Wait flag set");
                true
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to set wait flag");
                false
            }
        }
    }

    fn write_pid(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, std::process::id().to_string())
    }

    /// Remove the flag; an absent flag counts as success
    pub fn clear_waiting(&self) -> bool {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Wait flag cleared");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to clear wait flag");
                false
            }
        }
    }

    /// Whether the flag is present. Read-only.
    pub fn is_waiting(&self) -> bool {
        self.path.exists()
    }

    /// When the flag was last written, if present
    pub fn waiting_since(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> WaitFlagStore {
        WaitFlagStore::new(tmp.path().join("nested").join("waiting"))
    }

    #[test]
    fn test_default_path_under_home() {
        let path = WaitFlagStore::default_path();
        assert!(path.ends_with(".idlebell/waiting"), "got {}", path.display());
    }

    #[test]
    fn test_set_then_check() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(!store.is_waiting());

        assert!(store.set_waiting());
        assert!(store.is_waiting());
        assert!(store.waiting_since().is_some());
    }

    #[test]
    fn test_flag_contains_pid() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.set_waiting();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn test_set_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(store.set_waiting());
        assert!(store.set_waiting());
        assert!(store.is_waiting());
    }

    #[test]
    fn test_clear_then_check() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.set_waiting();

        assert!(store.clear_waiting());
        assert!(!store.is_waiting());
        assert!(store.waiting_since().is_none());
    }

    #[test]
    fn test_clear_twice_is_fine() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(store.clear_waiting());
        assert!(store.clear_waiting());
    }

    #[test]
    fn test_is_waiting_has_no_side_effects() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(!store.is_waiting());
        assert!(!store.path().exists());
        assert!(!store.path().parent().unwrap().exists());
    }

    #[test]
    fn test_set_fails_when_parent_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();

        let store = WaitFlagStore::new(blocker.join("waiting"));
        assert!(!store.set_waiting());
        assert!(!store.is_waiting());
    }
}
