//! Subcommand handlers
//!
//! Each handler maps an operation onto the exit-code contract of the CLI.
//! Nothing here returns an error: failures are logged and become exit codes.

use std::path::Path;
use std::process::ExitCode;
use std::time::SystemTime;

use crate::notify::{NotificationRequest, Notifier};
use crate::status::SessionStatus;
use crate::wait_flag::WaitFlagStore;

/// Process exit status of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

impl From<bool> for Exit {
    fn from(ok: bool) -> Self {
        if ok {
            Exit::Success
        } else {
            Exit::Failure
        }
    }
}

/// `notify`: 0 if any mechanism delivered, 1 otherwise
pub async fn notify(notifier: &Notifier, request: &NotificationRequest) -> Exit {
    notifier.notify(request).await.into()
}

/// `start-wait`: set the flag, then notify. Always 0.
pub async fn start_wait(store: &WaitFlagStore, notifier: &Notifier, request: &NotificationRequest) -> Exit {
    if !store.set_waiting() {
        tracing::warn!(path = %store.path().display(), "Continuing without wait flag");
    }
    notifier.notify(request).await;
    Exit::Success
}

/// `end-wait`: clear the flag. Always 0.
pub fn end_wait(store: &WaitFlagStore) -> Exit {
    store.clear_waiting();
    Exit::Success
}

/// Result of `check`
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub waiting: bool,
    pub since: Option<SystemTime>,
}

impl CheckReport {
    pub fn label(&self) -> &'static str {
        if self.waiting {
            "WAITING"
        } else {
            "NOT_WAITING"
        }
    }

    /// 0 when waiting, 1 when not
    pub fn exit(&self) -> Exit {
        self.waiting.into()
    }

    /// Label plus how long the flag has been set
    pub fn verbose(&self) -> String {
        match self.since.and_then(|t| t.elapsed().ok()) {
            Some(elapsed) if self.waiting => {
                format!("{} (for {}s)", self.label(), elapsed.as_secs())
            }
            _ => self.label().to_string(),
        }
    }
}

/// `check`: report the flag without touching it
pub fn check(store: &WaitFlagStore) -> CheckReport {
    let waiting = store.is_waiting();
    CheckReport {
        waiting,
        since: if waiting { store.waiting_since() } else { None },
    }
}

/// `status`: write a status record. 1 if the file could not be written.
pub fn write_status(path: &Path, waiting: bool, message: &str) -> Exit {
    match SessionStatus::new(waiting, message).write(path) {
        Ok(()) => Exit::Success,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to write status file");
            Exit::Failure
        }
    }
}
