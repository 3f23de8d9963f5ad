//! Claude Code hook ingestion
//!
//! `idlebell hook` is meant to be registered as a Claude Code hook command.
//! Claude Code pipes one JSON document per invocation on stdin; the event name
//! decides whether a wait begins (set flag, write status, maybe notify) or ends
//! (clear flag, write status). A hook must never break the session, so every
//! failure here is logged and swallowed.

use std::path::Path;

use serde::Deserialize;

use crate::config::NotifierConfig;
use crate::notify::{NotificationRequest, Notifier};
use crate::status::SessionStatus;
use crate::wait_flag::WaitFlagStore;

/// Subset of the hook payload we care about
#[derive(Debug, Clone, Deserialize)]
pub struct HookInput {
    /// Hook type that triggered this event
    pub hook_event_name: String,

    #[serde(default)]
    pub session_id: Option<String>,

    /// Notification message (Notification)
    #[serde(default)]
    pub message: Option<String>,

    /// Current working directory of the session
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Effect of a hook event on the wait flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTransition {
    /// Session now waits on the user
    Begin,
    /// User is back / session is working or gone
    End,
    /// No change
    Ignore,
}

/// Map a hook event name to a wait transition
pub fn transition_for(hook_name: &str) -> WaitTransition {
    match hook_name {
        // Claude finished responding, or is blocked on the user
        "Stop" | "Notification" | "PermissionRequest" => WaitTransition::Begin,

        // User answered, or Claude is busy again
        "UserPromptSubmit" | "PreToolUse" | "PostToolUse" | "SessionEnd" => WaitTransition::End,

        _ => WaitTransition::Ignore,
    }
}

impl HookInput {
    /// Project name from cwd, for notification text
    fn project(&self) -> String {
        self.cwd
            .as_deref()
            .and_then(|dir| Path::new(dir).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "session".to_string())
    }

    /// Message describing why the session is waiting
    fn waiting_message(&self, defaults: &NotifierConfig) -> String {
        let project = self.project();
        match self.hook_event_name.as_str() {
            "Notification" => match self.message.as_deref().filter(|m| !m.trim().is_empty()) {
                Some(msg) => format!("{project}: {msg}"),
                None => format!("{project}: {}", defaults.message),
            },
            "PermissionRequest" => format!("Approve in {project}"),
            _ => format!("{project}: {}", defaults.message),
        }
    }
}

/// Process one hook payload. Returns the transition that was applied.
pub async fn handle(
    input: &str,
    store: &WaitFlagStore,
    status_path: &Path,
    notifier: Option<&Notifier>,
    defaults: &NotifierConfig,
) -> WaitTransition {
    if input.trim().is_empty() {
        return WaitTransition::Ignore;
    }

    let hook: HookInput = match serde_json::from_str(input) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(
                error = %e,
                input_len = input.len(),
                "Invalid hook JSON (check hook configuration)"
            );
            return WaitTransition::Ignore;
        }
    };

    let transition = transition_for(&hook.hook_event_name);
    tracing::debug!(
        event = %hook.hook_event_name,
        session = ?hook.session_id,
        ?transition,
        "Hook event"
    );

    match transition {
        WaitTransition::Begin => {
            let message = hook.waiting_message(defaults);
            store.set_waiting();
            write_status(status_path, &SessionStatus::new(true, message.clone()));

            if let Some(notifier) = notifier {
                notifier
                    .notify(&NotificationRequest::new(defaults.title.clone(), message))
                    .await;
            }
        }
        WaitTransition::End => {
            store.clear_waiting();
            write_status(status_path, &SessionStatus::new(false, String::new()));
        }
        WaitTransition::Ignore => {}
    }

    transition
}

fn write_status(path: &Path, status: &SessionStatus) {
    if let Err(e) = status.write(path) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to write status file");
    }
}
