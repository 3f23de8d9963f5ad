//! Notification fallback chain
//!
//! A [`Notifier`] holds the ordered list of delivery mechanisms for the host
//! platform and tries them one at a time until one succeeds. Every attempt runs
//! under the same time bound, and any error or timeout just moves on to the
//! next mechanism.

pub mod mechanisms;
pub mod platform;

use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::errors::{IdlebellError, Result};
pub use platform::Platform;

/// Default time bound for a single delivery attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Title and message for one alert. Built per call, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Capability class of a mechanism, in the order the chain prefers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MechanismKind {
    /// Native OS toast / balloon
    Toast,
    /// Scripting host or notification daemon client
    Script,
    /// Broadcast to logged-in terminals
    Broadcast,
    /// Audible tones
    Tone,
    /// BEL control characters on the console
    Bell,
}

/// One way of getting a human-visible (or audible) signal out.
///
/// Implementations do not need to bound their own runtime; the [`Notifier`]
/// wraps every call in a timeout and drops the future when it expires.
pub trait Mechanism: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> MechanismKind;

    fn deliver<'a>(&'a self, request: &'a NotificationRequest) -> BoxFuture<'a, Result<()>>;
}

/// Ordered fallback chain of mechanisms
pub struct Notifier {
    mechanisms: Vec<Box<dyn Mechanism>>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(mechanisms: Vec<Box<dyn Mechanism>>, timeout: Duration) -> Self {
        Self {
            mechanisms,
            timeout,
        }
    }

    /// Build the chain for a given platform
    pub fn for_platform(platform: Platform, timeout: Duration) -> Self {
        Self::new(platform::mechanisms_for(platform), timeout)
    }

    /// Build the chain for the platform this process runs on
    pub fn detect(timeout: Duration) -> Self {
        let platform = platform::current();
        let notifier = Self::for_platform(platform, timeout);
        tracing::debug!(%platform, mechanisms = ?notifier.mechanism_names(), "Notification chain");
        notifier
    }

    /// Names of the mechanisms in the order they will be tried
    pub fn mechanism_names(&self) -> Vec<&'static str> {
        self.mechanisms.iter().map(|m| m.name()).collect()
    }

    /// Try each mechanism once, in order, stopping at the first success.
    ///
    /// Returns the name of the mechanism that delivered the alert.
    pub async fn send(&self, request: &NotificationRequest) -> Result<&'static str> {
        if self.mechanisms.is_empty() {
            return Err(IdlebellError::Unsupported(std::env::consts::OS.to_string()));
        }

        for mechanism in &self.mechanisms {
            let name = mechanism.name();
            let outcome = match tokio::time::timeout(self.timeout, mechanism.deliver(request)).await
            {
                Ok(result) => result,
                Err(_) => Err(IdlebellError::Timeout {
                    mechanism: name,
                    after: self.timeout,
                }),
            };

            match outcome {
                Ok(()) => {
                    tracing::info!(mechanism = name, kind = ?mechanism.kind(), "Notification delivered");
                    return Ok(name);
                }
                Err(e) => {
                    tracing::debug!(mechanism = name, error = %e, "Mechanism failed, trying next");
                }
            }
        }

        Err(IdlebellError::Exhausted {
            attempted: self.mechanisms.len(),
        })
    }

    /// Boolean form of [`Notifier::send`]; failures are logged, never raised
    pub async fn notify(&self, request: &NotificationRequest) -> bool {
        match self.send(request).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(title = %request.title, error = %e, "Notification not delivered");
                false
            }
        }
    }
}
