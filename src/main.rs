//! buildmatrix CLI - conda recipe matrix builder
//!
//! Entry point for the buildmatrix command-line application.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use buildmatrix::cli::output::display_error;
use buildmatrix::cli::Cli;
use buildmatrix::config::defaults;
use buildmatrix::infra::process::ProcessRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging(cli.log.clone(), cli.verbose)?;
    println!("Logging summary to {}", log_path.display());

    let registry = ProcessRegistry::new();
    let cancel = CancellationToken::new();
    spawn_signal_task(cancel.clone(), registry.clone());

    // Run the pipeline and handle errors
    match cli.run(registry, cancel).await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}

/// Set up tracing to stderr and to a per-run log file.
///
/// Without an explicit path the log lands under the system temp dir, named
/// after the run's start time.
fn init_logging(log_file: Option<PathBuf>, verbose: u8) -> Result<PathBuf> {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let log_path = match log_file {
        Some(path) => path,
        None => {
            let dir = std::env::temp_dir().join(defaults::LOG_DIR_NAME);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory '{}'", dir.display()))?;
            let stamp = chrono::Local::now().format("%Y.%m.%d-%H.%M");
            dir.join(format!("{stamp}.log"))
        }
    };
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("Failed to create log file '{}'", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(std::sync::Mutex::new(file)))
        .init();

    Ok(log_path)
}

/// Cancel the run when a termination signal arrives.
///
/// Cancellation kills every tracked build child and stops further
/// scheduling; the run then exits nonzero through the normal error path.
fn spawn_signal_task(cancel: CancellationToken, registry: ProcessRegistry) {
    tokio::spawn(async move {
        wait_for_termination().await;
        tracing::error!(
            "Termination signal received; stopping {} tracked build(s)",
            registry.tracked().len()
        );
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};
    let Ok(mut term) = signal(SignalKind::terminate()) else {
        let _ = tokio::signal::ctrl_c().await;
        return;
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}
