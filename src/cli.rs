//! CLI definitions for Webtrail.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use webtrail_config::DEFAULT_CONFIG_PATH;

/// Webtrail CLI.
#[derive(Parser)]
#[command(name = "webtrail")]
#[command(about = "Record browser interactions and replay them as resilient workflows")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true, env = "WEBTRAIL_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Record a session until Ctrl-C and save it as a workflow
    Record {
        /// Page to open first
        #[arg(long)]
        url: String,

        /// Platform hint stored with the workflow
        #[arg(long, default_value = "web")]
        platform: String,

        /// Workflow name (default: the output file stem)
        #[arg(long)]
        name: Option<String>,

        /// Workflow JSON output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replay a recorded workflow
    Replay(ReplayArgs),

    /// List a workflow's actions and required variables
    Inspect {
        /// Workflow JSON file
        workflow: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Also run validation and report findings
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Args)]
pub(crate) struct ReplayArgs {
    /// Workflow JSON file
    pub workflow: PathBuf,

    /// Template variable as key=value (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// TOML or JSON file of template variables
    #[arg(long)]
    pub vars_file: Option<PathBuf>,

    /// Retries after the first attempt of each action
    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Abort on the first failed action
    #[arg(long)]
    pub stop_on_error: bool,

    /// Capture screenshots and write text/HTML reports
    #[arg(long)]
    pub debug: bool,

    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// JSON report path (default: next to the workflow)
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
