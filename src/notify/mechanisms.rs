//! Concrete notification mechanisms
//!
//! - [`DesktopToast`]: native notifications through notify-rust
//!   (freedesktop D-Bus, macOS notification center, WinRT toasts)
//! - [`ExternalCommand`]: any helper binary (notify-send, osascript, wall, ...)
//! - [`TerminalBell`]: BEL characters on stderr, the last resort

use std::io::Write;
use std::process::Stdio;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::AsyncWriteExt;

use super::{Mechanism, MechanismKind, NotificationRequest};
use crate::errors::{IdlebellError, Result};

/// How long the toast stays on screen (milliseconds)
const TOAST_DISPLAY_MS: i32 = 5000;

/// Native desktop notification via notify-rust
///
/// The platform call runs on its own thread so that a wedged notification
/// daemon can only ever cost us the chain timeout, never the process.
pub struct DesktopToast;

impl DesktopToast {
    const NAME: &'static str = "desktop-toast";
}

impl Mechanism for DesktopToast {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MechanismKind {
        MechanismKind::Toast
    }

    fn deliver<'a>(&'a self, request: &'a NotificationRequest) -> BoxFuture<'a, Result<()>> {
        let title = request.title.clone();
        let message = request.message.clone();

        async move {
            let (tx, rx) = tokio::sync::oneshot::channel();

            // Detached; a timed-out caller just drops the receiver
            std::thread::spawn(move || {
                let result = notify_rust::Notification::new()
                    .summary(&title)
                    .body(&message)
                    .timeout(TOAST_DISPLAY_MS)
                    .show()
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                let _ = tx.send(result);
            });

            match rx.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(reason)) => Err(IdlebellError::Failed {
                    mechanism: Self::NAME,
                    reason,
                }),
                Err(_) => Err(IdlebellError::Failed {
                    mechanism: Self::NAME,
                    reason: "notification thread exited without a result".to_string(),
                }),
            }
        }
        .boxed()
    }
}

/// Builds the argument list (or stdin payload) for a request
pub type RenderFn = fn(&NotificationRequest) -> Vec<String>;
pub type StdinFn = fn(&NotificationRequest) -> String;

/// Helper binary invoked with request-specific arguments
///
/// A missing binary maps to [`IdlebellError::Unavailable`], a non-zero exit to
/// [`IdlebellError::Failed`]. The child is killed if the future is dropped,
/// which is what happens when the chain timeout fires.
pub struct ExternalCommand {
    name: &'static str,
    kind: MechanismKind,
    program: &'static str,
    args: RenderFn,
    stdin: Option<StdinFn>,
}

impl ExternalCommand {
    pub fn new(name: &'static str, kind: MechanismKind, program: &'static str, args: RenderFn) -> Self {
        Self {
            name,
            kind,
            program,
            args,
            stdin: None,
        }
    }

    /// Feed a rendered payload on stdin instead of (or alongside) arguments
    pub fn with_stdin(mut self, stdin: StdinFn) -> Self {
        self.stdin = Some(stdin);
        self
    }

    async fn run(&self, request: &NotificationRequest) -> Result<()> {
        let mut command = tokio::process::Command::new(self.program);
        command
            .args((self.args)(request))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IdlebellError::Unavailable {
                    mechanism: self.name,
                }
            } else {
                IdlebellError::Io(e)
            }
        })?;

        if let Some(render) = self.stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(render(request).as_bytes()).await?;
                pipe.shutdown().await?;
            }
        }

        let status = child.wait().await?;
        if status.success() {
            tracing::debug!(program = self.program, "Helper command succeeded");
            Ok(())
        } else {
            Err(IdlebellError::Failed {
                mechanism: self.name,
                reason: format!("{} exited with {status}", self.program),
            })
        }
    }
}

impl Mechanism for ExternalCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> MechanismKind {
        self.kind
    }

    fn deliver<'a>(&'a self, request: &'a NotificationRequest) -> BoxFuture<'a, Result<()>> {
        self.run(request).boxed()
    }
}

/// Writes BEL control characters to stderr
pub struct TerminalBell {
    count: usize,
}

impl TerminalBell {
    pub fn new(count: usize) -> Self {
        Self { count: count.max(1) }
    }

    fn ring(&self, out: &mut impl Write) -> std::io::Result<()> {
        out.write_all("\x07".repeat(self.count).as_bytes())?;
        out.flush()
    }
}

impl Mechanism for TerminalBell {
    fn name(&self) -> &'static str {
        "terminal-bell"
    }

    fn kind(&self) -> MechanismKind {
        MechanismKind::Bell
    }

    fn deliver<'a>(&'a self, _request: &'a NotificationRequest) -> BoxFuture<'a, Result<()>> {
        let result = self.ring(&mut std::io::stderr()).map_err(IdlebellError::from);
        futures_util::future::ready(result).boxed()
    }
}

/// Quote a string for an AppleScript string literal
pub fn applescript_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string for a PowerShell single-quoted literal
pub fn powershell_quote(s: &str) -> String {
    s.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NotificationRequest {
        NotificationRequest::new("Claude Code", "Waiting for your input")
    }

    fn no_args(_: &NotificationRequest) -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_applescript_quote() {
        assert_eq!(applescript_quote(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(applescript_quote(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_powershell_quote() {
        assert_eq!(powershell_quote("it's done"), "it''s done");
    }

    #[test]
    fn test_bell_writes_requested_count() {
        let bell = TerminalBell::new(3);
        let mut buf = Vec::new();
        bell.ring(&mut buf).unwrap();
        assert_eq!(buf, b"\x07\x07\x07");
    }

    #[test]
    fn test_bell_rings_at_least_once() {
        let bell = TerminalBell::new(0);
        let mut buf = Vec::new();
        bell.ring(&mut buf).unwrap();
        assert_eq!(buf, b"\x07");
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let cmd = ExternalCommand::new(
            "missing",
            MechanismKind::Script,
            "idlebell-definitely-not-installed",
            no_args,
        );
        let err = cmd.deliver(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            IdlebellError::Unavailable {
                mechanism: "missing"
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_command() {
        let cmd = ExternalCommand::new("true", MechanismKind::Script, "true", no_args);
        assert!(cmd.deliver(&request()).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command() {
        let cmd = ExternalCommand::new("false", MechanismKind::Script, "false", no_args);
        let err = cmd.deliver(&request()).await.unwrap_err();
        assert!(matches!(err, IdlebellError::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdin_payload_is_delivered() {
        fn expect_stdin(_: &NotificationRequest) -> Vec<String> {
            vec!["-c".to_string(), "grep -q 'Claude Code: Waiting'".to_string()]
        }
        fn payload(r: &NotificationRequest) -> String {
            format!("{}: {}\n", r.title, r.message)
        }

        let cmd = ExternalCommand::new("sh", MechanismKind::Broadcast, "sh", expect_stdin)
            .with_stdin(payload);
        assert!(cmd.deliver(&request()).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_command_hits_chain_timeout() {
        use super::super::Notifier;
        use std::time::{Duration, Instant};

        fn sleep_args(_: &NotificationRequest) -> Vec<String> {
            vec!["10".to_string()]
        }

        let notifier = Notifier::new(
            vec![Box::new(ExternalCommand::new(
                "sleep",
                MechanismKind::Script,
                "sleep",
                sleep_args,
            ))],
            Duration::from_millis(200),
        );

        let started = Instant::now();
        assert!(!notifier.notify(&request()).await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
