//! PopStruct CLI
//!
//! Command-line front end for the PopStruct population-genomics backend:
//! authentication, dataset management, analysis submission, job watching
//! and result download.

mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "popstruct")]
#[command(about = "PopStruct population structure analysis CLI", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "POPSTRUCT_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Where the login session is stored
    #[arg(long, env = "POPSTRUCT_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "popstruct_cli=warn,popstruct_watch=warn,popstruct_client=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.api_url, cli.session_file)?;

    handle_command(cli.command, &config).await
}
