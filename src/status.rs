//! Session status file
//!
//! A small JSON record written by whatever drives the assistant session (the
//! `status` and `hook` subcommands, or an external producer) and read by the
//! monitor:
//!
//! ```json
//! { "waiting_for_input": true, "message": "Waiting for your input", "timestamp": 1760600000.0 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// File name inside the platform temp directory
const STATUS_FILE_NAME: &str = "idlebell_status.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub waiting_for_input: bool,

    #[serde(default)]
    pub message: String,

    /// Epoch seconds (fractional)
    #[serde(default)]
    pub timestamp: f64,
}

impl SessionStatus {
    /// Status stamped with the current time
    pub fn new(waiting_for_input: bool, message: impl Into<String>) -> Self {
        Self {
            waiting_for_input,
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }

    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(STATUS_FILE_NAME)
    }

    /// Read the status file. `Ok(None)` when it does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write the whole record, replacing any previous content
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), waiting = self.waiting_for_input, "Wrote status file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IdlebellError;
    use tempfile::TempDir;

    #[test]
    fn test_default_path_in_temp_dir() {
        let path = SessionStatus::default_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with(STATUS_FILE_NAME));
    }

    #[test]
    fn test_new_stamps_current_time() {
        let before = chrono::Utc::now().timestamp() as f64;
        let status = SessionStatus::new(true, "hello");
        assert!(status.timestamp >= before - 1.0);
        assert!(status.waiting_for_input);
        assert_eq!(status.message, "hello");
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");
        let status = SessionStatus::new(true, "Waiting for your input");

        status.write(&path).unwrap();
        let read = SessionStatus::read(&path).unwrap().unwrap();
        assert_eq!(read, status);
    }

    #[test]
    fn test_read_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let read = SessionStatus::read(&tmp.path().join("absent.json")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_read_malformed_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SessionStatus::read(&path).unwrap_err();
        assert!(matches!(err, IdlebellError::Json(_)));
    }

    #[test]
    fn test_read_accepts_integer_timestamp_and_missing_message() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");
        std::fs::write(&path, r#"{"waiting_for_input": false, "timestamp": 1700000000}"#).unwrap();

        let status = SessionStatus::read(&path).unwrap().unwrap();
        assert!(!status.waiting_for_input);
        assert!(status.message.is_empty());
        assert!((status.timestamp - 1_700_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_waiting_field_is_required() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");
        std::fs::write(&path, r#"{"message": "hi"}"#).unwrap();
        assert!(SessionStatus::read(&path).is_err());
    }
}
