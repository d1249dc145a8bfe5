//! Webtrail - record browser sessions, replay them resiliently.
//!
//! Main entry point for the Webtrail CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use webtrail_config::{ConfigLoader, LoggingConfig};

mod cli;
mod cmd_record;
mod cmd_replay;
mod cmd_workflow;

use cli::{Cli, Commands};

fn webtrail_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".webtrail"))
        .unwrap_or_else(|| PathBuf::from(".webtrail"))
}

/// Initialize tracing with console and daily-rotated file output.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = logging
        .dir
        .clone()
        .unwrap_or_else(|| webtrail_dir().join("logs"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("webtrail")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes on drop, so the guard lives for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)?;
    init_tracing(&config.logging)?;
    tracing::debug!("Using configuration {}", cli.config.display());

    match cli.command {
        Commands::Record {
            url,
            platform,
            name,
            output,
        } => {
            cmd_record::run_record(&config, &url, &platform, name, &output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Replay(args) => cmd_replay::run_replay(config, args).await,
        Commands::Inspect { workflow } => {
            cmd_workflow::inspect(&workflow)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { validate } => cmd_workflow::show_config(&config, validate),
    }
}
