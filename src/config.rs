//! idlebell configuration
//!
//! Optional TOML file at `~/.config/idlebell/config.toml`. Every field has a
//! default, and command-line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::notify::{NotificationRequest, DEFAULT_TIMEOUT};
use crate::status::SessionStatus;
use crate::wait_flag::WaitFlagStore;

/// Default notification title
pub const DEFAULT_TITLE: &str = "Claude Code";

/// Default notification body
pub const DEFAULT_MESSAGE: &str = "Waiting for your input";

/// Application configuration loaded from file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdlebellConfig {
    #[serde(default)]
    pub notifier: NotifierConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

/// Notification chain settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Upper bound for a single mechanism attempt
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Title used when none is given on the command line
    #[serde(default = "default_title")]
    pub title: String,

    /// Message used when none is given on the command line
    #[serde(default = "default_message")]
    pub message: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            title: default_title(),
            message: default_message(),
        }
    }
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Build a request, falling back to the configured title/message
    pub fn request(&self, title: Option<String>, message: Option<String>) -> NotificationRequest {
        NotificationRequest::new(
            title.unwrap_or_else(|| self.title.clone()),
            message.unwrap_or_else(|| self.message.clone()),
        )
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

/// Polling monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between status file polls
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Minimum seconds between two notifications
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

fn default_interval_secs() -> u64 {
    5
}

fn default_cooldown_secs() -> u64 {
    300
}

/// File locations; unset means the built-in default
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    #[serde(default)]
    pub flag_file: Option<PathBuf>,

    #[serde(default)]
    pub status_file: Option<PathBuf>,
}

impl IdlebellConfig {
    /// Load configuration from default path (~/.config/idlebell/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Get the default configuration path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || PathBuf::from("~/.config/idlebell/config.toml"),
            |dirs| dirs.config_dir().join("idlebell").join("config.toml"),
        )
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::debug!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Wait flag location, honoring the config override
    pub fn flag_file(&self) -> PathBuf {
        self.paths
            .flag_file
            .clone()
            .unwrap_or_else(WaitFlagStore::default_path)
    }

    /// Status file location, honoring the config override
    pub fn status_file(&self) -> PathBuf {
        self.paths
            .status_file
            .clone()
            .unwrap_or_else(SessionStatus::default_path)
    }

    /// Generate example configuration file content
    pub fn example() -> String {
        r#"# idlebell configuration
# Place this file at ~/.config/idlebell/config.toml

[notifier]
# Seconds before a notification mechanism is abandoned for the next one
timeout_secs = 5

# Defaults for --title / --message
title = "Claude Code"
message = "Waiting for your input"

[monitor]
# Seconds between status file polls
interval_secs = 5

# Minimum seconds between two notifications for the same waiting state
cooldown_secs = 300

[paths]
# Wait flag marker file (default: ~/.idlebell/waiting)
# flag_file = "/home/me/.idlebell/waiting"

# Status file read by `idlebell monitor` (default: <temp dir>/idlebell_status.json)
# status_file = "/tmp/idlebell_status.json"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = IdlebellConfig::default();
        assert_eq!(config.notifier.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.monitor.interval(), Duration::from_secs(5));
        assert_eq!(config.monitor.cooldown(), Duration::from_secs(300));
        assert_eq!(config.flag_file(), WaitFlagStore::default_path());
        assert_eq!(config.status_file(), SessionStatus::default_path());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = IdlebellConfig::load_from_path(tmp.path().join("config.toml"));
        assert_eq!(config.monitor.cooldown_secs, 300);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[monitor]\ncooldown_secs = 60\n\n[paths]\nflag_file = \"/var/tmp/flag\"\n",
        )
        .unwrap();

        let config = IdlebellConfig::load_from_path(path);
        assert_eq!(config.monitor.cooldown_secs, 60);
        assert_eq!(config.monitor.interval_secs, 5);
        assert_eq!(config.notifier.title, DEFAULT_TITLE);
        assert_eq!(config.flag_file(), PathBuf::from("/var/tmp/flag"));
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[monitor\ncooldown_secs = ").unwrap();

        let config = IdlebellConfig::load_from_path(path);
        assert_eq!(config.monitor.cooldown_secs, 300);
    }

    #[test]
    fn test_example_parses_to_defaults() {
        let parsed: IdlebellConfig = toml::from_str(&IdlebellConfig::example()).unwrap();
        assert_eq!(parsed.notifier.timeout_secs, 5);
        assert_eq!(parsed.monitor.cooldown_secs, 300);
        assert!(parsed.paths.flag_file.is_none());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let monitor = MonitorConfig {
            interval_secs: 0,
            cooldown_secs: 0,
        };
        assert_eq!(monitor.interval(), Duration::from_secs(1));
        assert_eq!(monitor.cooldown(), Duration::ZERO);
    }

    #[test]
    fn test_request_overrides() {
        let notifier = NotifierConfig::default();
        let request = notifier.request(None, Some("Approve the edit".to_string()));
        assert_eq!(request.title, DEFAULT_TITLE);
        assert_eq!(request.message, "Approve the edit");
    }
}
