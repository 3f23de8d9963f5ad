//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros.

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Desktop notifications and a wait flag for Claude Code sessions
#[derive(Parser, Debug)]
#[command(name = "idlebell")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Wait flag file (default: ~/.idlebell/waiting, or [paths].flag_file)
    #[arg(long, env = "IDLEBELL_FLAG_FILE", global = true)]
    pub flag_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification (exit 0 if delivered, 1 otherwise)
    Notify {
        /// Notification title
        #[arg(short, long)]
        title: Option<String>,

        /// Notification body
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Mark the session as waiting for input and notify
    StartWait {
        /// Notification title
        #[arg(short, long)]
        title: Option<String>,

        /// Notification body
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Clear the waiting mark
    EndWait,

    /// Print WAITING (exit 0) or NOT_WAITING (exit 1)
    Check {
        /// Also print how long the session has been waiting
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },

    /// Poll a status file and notify when it reports waiting_for_input
    Monitor {
        /// Status file to watch (default: <temp dir>/idlebell_status.json)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Seconds between polls
        #[arg(short, long)]
        interval: Option<u64>,

        /// Minimum seconds between notifications
        #[arg(short, long)]
        cooldown: Option<u64>,
    },

    /// Write a status record for the monitor
    Status {
        /// Whether the session is waiting for input
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        waiting: bool,

        /// Message carried in the record
        #[arg(short, long)]
        message: Option<String>,

        /// Status file to write (default: <temp dir>/idlebell_status.json)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Process Claude Code hook JSON from stdin
    ///
    /// Stop, Notification and PermissionRequest start a wait; UserPromptSubmit,
    /// PreToolUse, PostToolUse and SessionEnd end it. Always exits 0.
    Hook {
        /// Send desktop notification when a wait starts
        #[arg(short = 'N', long, default_value_t = false)]
        notify: bool,
    },

    /// Show the configuration file location and an example
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions and print to stdout
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "idlebell", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_waiting_flag_takes_value() {
        let cli = Cli::try_parse_from(["idlebell", "status", "--waiting", "false", "-m", "done"]).unwrap();
        match cli.command {
            Commands::Status { waiting, message, file } => {
                assert!(!waiting);
                assert_eq!(message.as_deref(), Some("done"));
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_status_defaults_to_waiting() {
        let cli = Cli::try_parse_from(["idlebell", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { waiting: true, .. }));
    }

    #[test]
    fn test_monitor_overrides() {
        let cli = Cli::try_parse_from([
            "idlebell",
            "monitor",
            "--file",
            "/tmp/s.json",
            "--interval",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Monitor {
                file,
                interval,
                cooldown,
            } => {
                assert_eq!(file, Some(PathBuf::from("/tmp/s.json")));
                assert_eq!(interval, Some(2));
                assert!(cooldown.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flag_file() {
        let cli = Cli::try_parse_from(["idlebell", "check", "--flag-file", "/tmp/flag"]).unwrap();
        assert_eq!(cli.flag_file, Some(PathBuf::from("/tmp/flag")));
    }
}
