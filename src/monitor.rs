//! Status file polling monitor
//!
//! Reads the session status file on a fixed interval and raises a notification
//! when it says the session is waiting for input. A cooldown keeps a sustained
//! waiting state from producing a notification on every poll. The monitor only
//! ever reads the status file.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_MESSAGE, DEFAULT_TITLE};
use crate::notify::{NotificationRequest, Notifier};
use crate::status::SessionStatus;

/// What a single poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status file does not exist
    Missing,
    /// Status file exists but could not be read or parsed
    Malformed,
    /// Session is not waiting
    Idle,
    /// Waiting, but the last notification is too recent
    CoolingDown,
    /// Waiting, notification delivered
    Notified,
    /// Waiting, every mechanism failed (still counts against the cooldown)
    NotifyFailed,
}

pub struct Monitor {
    status_path: PathBuf,
    interval: Duration,
    cooldown: Duration,
    notifier: Notifier,
    title: String,
    fallback_message: String,
    last_sent: Option<Instant>,
    /// Whether the last poll found no status file
    status_missing: bool,
}

impl Monitor {
    pub fn new(status_path: PathBuf, interval: Duration, cooldown: Duration, notifier: Notifier) -> Self {
        Self {
            status_path,
            interval,
            cooldown,
            notifier,
            title: DEFAULT_TITLE.to_string(),
            fallback_message: DEFAULT_MESSAGE.to_string(),
            last_sent: None,
            status_missing: false,
        }
    }

    /// Title for notifications, and the body used when the status has no message
    pub fn with_defaults(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.title = title.into();
        self.fallback_message = message.into();
        self
    }

    /// Read the status file once and notify if warranted
    pub async fn poll(&mut self) -> PollOutcome {
        let status = match SessionStatus::read(&self.status_path) {
            Ok(Some(status)) => {
                if self.status_missing {
                    tracing::info!(path = %self.status_path.display(), "Status file appeared");
                    self.status_missing = false;
                }
                status
            }
            Ok(None) => {
                if self.status_missing {
                    tracing::debug!(path = %self.status_path.display(), "Status file still missing");
                } else {
                    tracing::info!(path = %self.status_path.display(), "Status file not found, waiting for it");
                }
                self.status_missing = true;
                return PollOutcome::Missing;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.status_path.display(),
                    error = %e,
                    "Unreadable status file, skipping this poll"
                );
                return PollOutcome::Malformed;
            }
        };

        if !status.waiting_for_input {
            return PollOutcome::Idle;
        }

        let now = Instant::now();
        if let Some(last) = self.last_sent {
            if now.duration_since(last) < self.cooldown {
                return PollOutcome::CoolingDown;
            }
        }

        let message = if status.message.trim().is_empty() {
            self.fallback_message.clone()
        } else {
            status.message
        };
        let request = NotificationRequest::new(self.title.clone(), message);

        let delivered = self.notifier.notify(&request).await;
        self.last_sent = Some(now);

        if delivered {
            tracing::info!(status_timestamp = status.timestamp, "Session waiting, notified");
            PollOutcome::Notified
        } else {
            PollOutcome::NotifyFailed
        }
    }

    /// Poll until cancelled. The first poll happens immediately.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            path = %self.status_path.display(),
            interval_secs = self.interval.as_secs(),
            cooldown_secs = self.cooldown.as_secs(),
            "Monitor started"
        );

        loop {
            // Cancellation must also interrupt a poll whose notification is in flight
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                outcome = self.poll() => tracing::trace!(?outcome, "Poll complete"),
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Monitor stopped");
    }
}
