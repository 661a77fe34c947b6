//! Analysis command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use popstruct_core::domain::dataset::DatasetId;
use popstruct_core::domain::job::AnalysisType;
use popstruct_core::dto::analysis::{CreateAnalysis, parse_parameter};
use serde_json::Value;

use super::job::watch_job;
use crate::config::Config;
use crate::render::print_job_details;

/// Analysis subcommands
#[derive(Subcommand)]
pub enum AnalysisCommands {
    /// Submit an analysis (pca, clustering, kinship or full)
    Run {
        /// Analysis type
        analysis: AnalysisType,

        /// Dataset to analyse
        #[arg(short, long)]
        dataset: DatasetId,

        /// Job name (defaults to "<analysis> - dataset <id>")
        #[arg(short, long)]
        name: Option<String>,

        /// Parameters as key=value pairs (e.g., n_components=10 n_clusters=4)
        #[arg(short, long, value_parser = parse_parameter)]
        param: Vec<(String, Value)>,

        /// Follow the job after submission
        #[arg(short, long)]
        watch: bool,
    },
}

pub async fn handle_analysis_command(command: AnalysisCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        AnalysisCommands::Run {
            analysis,
            dataset,
            name,
            param,
            watch,
        } => {
            let quota = client.subscription_status().await?;
            if !quota.can_create_job {
                anyhow::bail!(
                    "Job limit reached on the {} plan ({} used). Upgrade with `popstruct subscription create-order`.",
                    quota.subscription_tier,
                    quota.jobs_used
                );
            }

            let name = name.unwrap_or_else(|| default_job_name(analysis, dataset));
            let request = param
                .into_iter()
                .fold(CreateAnalysis::new(name, dataset), |req, (key, value)| {
                    req.with_parameter(key, value)
                });

            let job = client.submit_analysis(analysis, &request).await?;
            println!(
                "{} {} submitted as job {}",
                "✓".green(),
                analysis.label(),
                job.id.to_string().bold()
            );

            if watch {
                watch_job(client, job.id, config).await
            } else {
                print_job_details(&job);
                Ok(())
            }
        }
    }
}

fn default_job_name(analysis: AnalysisType, dataset: DatasetId) -> String {
    format!("{} - dataset {}", analysis.label(), dataset)
}
