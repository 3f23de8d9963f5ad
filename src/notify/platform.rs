//! Platform detection and per-platform mechanism lists
//!
//! The host platform is read once per process. Each platform gets an ordered
//! list going from the richest signal (a native toast) down to a console bell.

use once_cell::sync::Lazy;

use super::mechanisms::{applescript_quote, powershell_quote, DesktopToast, ExternalCommand, TerminalBell};
use super::{Mechanism, MechanismKind, NotificationRequest};

/// Number of BEL characters the last-resort mechanism writes
const BELL_COUNT: usize = 3;

/// Operating system family, as far as notifications are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux and the BSDs (freedesktop notification stack)
    Linux,
    MacOs,
    Windows,
    /// Anything else: no mechanisms, notifications always fail
    Unsupported,
}

impl Platform {
    /// Map a `std::env::consts::OS` value to a platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Unsupported,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
            Platform::Unsupported => write!(f, "unsupported"),
        }
    }
}

static CURRENT: Lazy<Platform> = Lazy::new(|| {
    let platform = Platform::from_os(std::env::consts::OS);
    tracing::debug!(os = std::env::consts::OS, %platform, "Detected platform");
    platform
});

/// Platform of the running process (detected on first use)
pub fn current() -> Platform {
    *CURRENT
}

/// Ordered fallback list for a platform
pub fn mechanisms_for(platform: Platform) -> Vec<Box<dyn Mechanism>> {
    match platform {
        Platform::Linux => vec![
            Box::new(DesktopToast),
            Box::new(ExternalCommand::new(
                "notify-send",
                MechanismKind::Script,
                "notify-send",
                notify_send_args,
            )),
            Box::new(
                ExternalCommand::new("wall", MechanismKind::Broadcast, "wall", no_args)
                    .with_stdin(broadcast_text),
            ),
            Box::new(ExternalCommand::new(
                "beep",
                MechanismKind::Tone,
                "beep",
                beep_args,
            )),
            Box::new(TerminalBell::new(BELL_COUNT)),
        ],
        Platform::MacOs => vec![
            Box::new(DesktopToast),
            Box::new(ExternalCommand::new(
                "terminal-notifier",
                MechanismKind::Script,
                "terminal-notifier",
                terminal_notifier_args,
            )),
            Box::new(ExternalCommand::new(
                "osascript-notification",
                MechanismKind::Script,
                "osascript",
                osascript_notification_args,
            )),
            Box::new(
                ExternalCommand::new("wall", MechanismKind::Broadcast, "wall", no_args)
                    .with_stdin(broadcast_text),
            ),
            Box::new(ExternalCommand::new(
                "osascript-beep",
                MechanismKind::Tone,
                "osascript",
                osascript_beep_args,
            )),
            Box::new(TerminalBell::new(BELL_COUNT)),
        ],
        Platform::Windows => vec![
            Box::new(DesktopToast),
            Box::new(ExternalCommand::new(
                "powershell-balloon",
                MechanismKind::Script,
                "powershell",
                powershell_balloon_args,
            )),
            Box::new(ExternalCommand::new(
                "msg",
                MechanismKind::Broadcast,
                "msg",
                msg_args,
            )),
            Box::new(ExternalCommand::new(
                "powershell-beep",
                MechanismKind::Tone,
                "powershell",
                powershell_beep_args,
            )),
            Box::new(TerminalBell::new(BELL_COUNT)),
        ],
        Platform::Unsupported => Vec::new(),
    }
}

fn no_args(_: &NotificationRequest) -> Vec<String> {
    Vec::new()
}

fn broadcast_text(request: &NotificationRequest) -> String {
    format!("{}: {}\n", request.title, request.message)
}

fn notify_send_args(request: &NotificationRequest) -> Vec<String> {
    vec![
        "--app-name=idlebell".to_string(),
        "--urgency=normal".to_string(),
        request.title.clone(),
        request.message.clone(),
    ]
}

fn beep_args(_: &NotificationRequest) -> Vec<String> {
    ["-f", "880", "-l", "200", "-r", "3"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn terminal_notifier_args(request: &NotificationRequest) -> Vec<String> {
    vec![
        "-title".to_string(),
        request.title.clone(),
        "-message".to_string(),
        request.message.clone(),
        "-sound".to_string(),
        "default".to_string(),
    ]
}

fn osascript_notification_args(request: &NotificationRequest) -> Vec<String> {
    let script = format!(
        "display notification \"{}\" with title \"{}\" sound name \"Glass\"",
        applescript_quote(&request.message),
        applescript_quote(&request.title)
    );
    vec!["-e".to_string(), script]
}

fn osascript_beep_args(_: &NotificationRequest) -> Vec<String> {
    vec!["-e".to_string(), "beep 3".to_string()]
}

fn powershell_balloon_args(request: &NotificationRequest) -> Vec<String> {
    let script = format!(
        "Add-Type -AssemblyName System.Windows.Forms; \
         Add-Type -AssemblyName System.Drawing; \
         $n = New-Object System.Windows.Forms.NotifyIcon; \
         $n.Icon = [System.Drawing.SystemIcons]::Information; \
         $n.BalloonTipTitle = '{}'; \
         $n.BalloonTipText = '{}'; \
         $n.Visible = $true; \
         $n.ShowBalloonTip(5000); \
         Start-Sleep -Seconds 2; \
         $n.Dispose()",
        powershell_quote(&request.title),
        powershell_quote(&request.message)
    );
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        script,
    ]
}

fn msg_args(request: &NotificationRequest) -> Vec<String> {
    vec![
        "*".to_string(),
        "/TIME:30".to_string(),
        format!("{}: {}", request.title, request.message),
    ]
}

fn powershell_beep_args(_: &NotificationRequest) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        "[console]::beep(880,250); [console]::beep(880,250); [console]::beep(880,250)".to_string(),
    ]
}
