// Clippy configuration: enable pedantic but allow overly strict lints
#![allow(clippy::missing_errors_doc)] // Internal functions don't need # Errors docs
#![allow(clippy::missing_panics_doc)] // Internal functions don't need # Panics docs
#![allow(clippy::must_use_candidate)] // Not all getters need #[must_use]
#![allow(clippy::module_name_repetitions)] // e.g., NotifierConfig in config module is fine
#![allow(clippy::doc_markdown)] // Don't require backticks around PowerShell, JSON, etc.
#![allow(clippy::cast_precision_loss)] // Millisecond timestamps fit in f64
#![allow(clippy::needless_pass_by_value)] // PathBuf by value is fine for config loading

//! idlebell - tells you when Claude Code is waiting on you
//!
//! A single Rust binary that:
//! - Sends a desktop notification through the first mechanism that works on
//!   this host (native toast, helper binary, broadcast, beep, terminal bell)
//! - Keeps a wait flag file that other tools can check
//! - Optionally polls a status file and notifies on waiting, with a cooldown
//!
//! Usage:
//!   idlebell start-wait          # Set flag + notify
//!   idlebell check               # WAITING / NOT_WAITING
//!   idlebell hook --notify       # Registered as a Claude Code hook

mod cli;
mod commands;
mod config;
mod errors;
mod hook;
mod monitor;
mod notify;
mod status;
mod wait_flag;

use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::Result;
use commands::Exit;
use config::IdlebellConfig;
use notify::Notifier;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || std::env::temp_dir().join("idlebell").join("logs"),
        |dirs| dirs.cache_dir().join("idlebell").join("logs"),
    )
}

/// Daily rolling file log plus warnings on stderr.
///
/// stdout is reserved for command output (`check`, `completions`), so
/// diagnostics only ever go to stderr.
fn init_logging(log_level: &str) -> Option<WorkerGuard> {
    let log_dir = get_log_dir();
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, "idlebell.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    let log_filter = format!("idlebell={log_level}");
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN),
        )
        .init();

    tracing::debug!("Log directory: {:?}", log_dir);
    guard
}

/// Read the whole hook payload from stdin
fn read_stdin() -> String {
    use std::io::Read;

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        tracing::warn!(error = %e, "Failed to read hook input from stdin");
    }
    input
}

async fn run_monitor(
    config: &IdlebellConfig,
    notifier: Notifier,
    file: Option<PathBuf>,
    interval: Option<u64>,
    cooldown: Option<u64>,
) {
    let mut settings = config.monitor.clone();
    if let Some(interval) = interval {
        settings.interval_secs = interval;
    }
    if let Some(cooldown) = cooldown {
        settings.cooldown_secs = cooldown;
    }
    let status_path = file.unwrap_or_else(|| config.status_file());

    let mut monitor = monitor::Monitor::new(status_path, settings.interval(), settings.cooldown(), notifier)
        .with_defaults(config.notifier.title.clone(), config.notifier.message.clone());

    // Ctrl-C ends the loop cleanly
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupt received, stopping monitor"),
            Err(e) => tracing::error!("Failed to listen for interrupt: {}", e),
        }
        signal_cancel.cancel();
    });

    monitor.run(cancel).await;
    signal_handle.abort();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize error handling
    color_eyre::install()?;
    let _guard = init_logging(&cli.log_level);

    let config = IdlebellConfig::load();
    let store = wait_flag::WaitFlagStore::new(cli.flag_file.clone().unwrap_or_else(|| config.flag_file()));
    let timeout = config.notifier.timeout();

    let exit = match cli.command {
        Commands::Notify { title, message } => {
            let notifier = Notifier::detect(timeout);
            commands::notify(&notifier, &config.notifier.request(title, message)).await
        }
        Commands::StartWait { title, message } => {
            let notifier = Notifier::detect(timeout);
            commands::start_wait(&store, &notifier, &config.notifier.request(title, message)).await
        }
        Commands::EndWait => commands::end_wait(&store),
        Commands::Check { verbose } => {
            let report = commands::check(&store);
            if verbose {
                println!("{}", report.verbose());
            } else {
                println!("{}", report.label());
            }
            report.exit()
        }
        Commands::Monitor {
            file,
            interval,
            cooldown,
        } => {
            run_monitor(&config, Notifier::detect(timeout), file, interval, cooldown).await;
            Exit::Success
        }
        Commands::Status {
            waiting,
            message,
            file,
        } => {
            let path = file.unwrap_or_else(|| config.status_file());
            let message = message.unwrap_or_else(|| {
                if waiting {
                    config.notifier.message.clone()
                } else {
                    String::new()
                }
            });
            commands::write_status(&path, waiting, &message)
        }
        Commands::Hook { notify } => {
            let input = read_stdin();
            let notifier = notify.then(|| Notifier::detect(timeout));
            hook::handle(
                &input,
                &store,
                &config.status_file(),
                notifier.as_ref(),
                &config.notifier,
            )
            .await;
            Exit::Success
        }
        Commands::Config => {
            println!("# {}", IdlebellConfig::default_path().display());
            print!("{}", IdlebellConfig::example());
            Exit::Success
        }
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            Exit::Success
        }
    };

    Ok(exit.into())
}
