use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use crate::config::load_config;

/// layerank — launch a layer-wise reranker distillation run, then evaluate it
#[derive(Debug, Parser)]
#[command(name = "layerank", version, about, long_about = None)]
struct Cli {
    /// Path to a custom configuration file (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log format: "pretty" (default) or "json".
    #[arg(long, global = true, default_value = "pretty", value_name = "FORMAT")]
    log_format: String,

    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Activate the environment, train on all workers, then evaluate.
    Run,

    /// Print the commands a run would execute, without executing them.
    ///
    /// The access token is shown as `***`.
    Plan {
        /// Emit a JSON array of `{stage, cwd, argv}` objects instead.
        #[arg(long)]
        json: bool,
    },

    /// Validate the resolved configuration and report problems.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialise tracing
    init_tracing(&cli.log_format);

    // Load configuration
    let cfg = match load_config(cli.config.as_ref()).context("Failed to load configuration") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&cfg).await,
        Commands::Plan { json } => commands::plan::run(&cfg, json),
        Commands::Check => commands::check::run(&cfg),
    };

    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn init_tracing(log_format: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout belongs to `plan`/`check` output and the children
    if log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
