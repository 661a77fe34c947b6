//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod analysis;
mod auth;
mod dataset;
mod job;
mod prompt;
mod subscription;

pub use analysis::AnalysisCommands;
pub use auth::AuthCommands;
pub use dataset::DatasetCommands;
pub use job::JobCommands;
pub use subscription::SubscriptionCommands;

use anyhow::Result;
use clap::Subcommand;
use popstruct_client::{ClientError, ErrorKind};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Login, signup and session management
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Genotype dataset management
    Dataset {
        #[command(subcommand)]
        command: DatasetCommands,
    },
    /// Submit analyses
    Analysis {
        #[command(subcommand)]
        command: AnalysisCommands,
    },
    /// Job monitoring and results
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Plan usage and upgrades
    Subscription {
        #[command(subcommand)]
        command: SubscriptionCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let result = match command {
        Commands::Auth { command } => auth::handle_auth_command(command, config).await,
        Commands::Dataset { command } => dataset::handle_dataset_command(command, config).await,
        Commands::Analysis { command } => {
            analysis::handle_analysis_command(command, config).await
        }
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Subscription { command } => {
            subscription::handle_subscription_command(command, config).await
        }
    };

    result.map_err(explain)
}

/// Adds a next step to errors the user can act on
fn explain(err: anyhow::Error) -> anyhow::Error {
    let Some(client_err) = err.downcast_ref::<ClientError>() else {
        return err;
    };

    match client_err.kind() {
        ErrorKind::AuthExpired => {
            let message = client_err.user_message();
            err.context(format!("{} Run `popstruct auth login`.", message))
        }
        ErrorKind::Transient | ErrorKind::Validation | ErrorKind::ResourceNotReady => {
            let message = client_err.user_message();
            err.context(message)
        }
        ErrorKind::NotFound | ErrorKind::Unexpected => err,
    }
}
