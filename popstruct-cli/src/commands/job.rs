//! Job command handlers
//!
//! Handles listing, details, live watching, result preview and archive
//! download of analysis jobs.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use popstruct_client::ApiClient;
use popstruct_core::domain::job::{JobId, JobStatus};
use popstruct_core::domain::page::JobPage;
use popstruct_core::dto::job::JobQuery;
use popstruct_watch::{
    JobListRefresher, JobSource, JobWatcher, ListState, ResultView, WatchState, download_archive,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::prompt::confirm;
use crate::config::Config;
use crate::render::{
    colorize_status, print_failure, print_job_details, print_job_summary,
    print_result_view, timestamp,
};

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List jobs
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page (defaults to POPSTRUCT_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,

        /// Only show jobs with this status
        #[arg(short, long)]
        status: Option<JobStatus>,

        /// Keep refreshing the list
        #[arg(short, long)]
        watch: bool,
    },
    /// Get job details
    Get { id: JobId },
    /// Follow a job until it finishes, then show its results
    Watch { id: JobId },
    /// Show the result preview of a completed job
    Preview {
        id: JobId,

        /// Also save the plot images into this directory
        #[arg(long)]
        plots_dir: Option<PathBuf>,
    },
    /// Download the full result archive
    Download {
        id: JobId,

        /// Directory to write job_<id>_results.zip into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Delete a job
    Delete {
        id: JobId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::List {
            page,
            page_size,
            status,
            watch,
        } => {
            let mut query = JobQuery::new(page, page_size.unwrap_or(config.watch.page_size));
            query.status = status;
            if watch {
                watch_job_list(client, query, config).await
            } else {
                let listing = client.list_jobs(&query).await?;
                print_job_list(&listing);
                Ok(())
            }
        }
        JobCommands::Get { id } => {
            let job = client.get_job(id).await?;
            print_job_details(&job);
            Ok(())
        }
        JobCommands::Watch { id } => watch_job(client, id, config).await,
        JobCommands::Preview { id, plots_dir } => {
            preview_results(&client, id, plots_dir.as_deref()).await
        }
        JobCommands::Download { id, output } => download_results(&client, id, &output).await,
        JobCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete job {}?", id))? {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
            client.delete_job(id).await?;
            println!("{} Job {} deleted", "✓".green(), id);
            Ok(())
        }
    }
}

fn print_job_list(listing: &JobPage) {
    if listing.jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "Jobs (page {} of {}, {} total):",
            listing.page,
            listing.total_pages(),
            listing.total
        )
        .bold()
    );
    println!();
    for job in &listing.jobs {
        print_job_summary(job);
    }
}

/// Re-prints the job list on every refresh until Ctrl+C
async fn watch_job_list(client: ApiClient, query: JobQuery, config: &Config) -> Result<()> {
    let source: Arc<dyn JobSource> = Arc::new(client);
    let mut list = JobListRefresher::new(source, &config.watch).start(query);

    println!(
        "{}",
        format!(
            "Refreshing every {}s (Ctrl+C to stop)",
            config.watch.list_refresh_interval.as_secs_f32()
        )
        .dimmed()
    );

    loop {
        let state = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                list.cancel();
                return Ok(());
            }
            state = list.changed() => state,
        };

        match state {
            Some(ListState::Ready(page)) => {
                println!("\n{}", timestamp(&chrono::Utc::now()).dimmed());
                print_job_list(&page);
            }
            Some(ListState::Error { failure, .. }) => print_failure(&failure),
            Some(ListState::Loading) => {}
            None => return Ok(()),
        }
    }
}

/// Follows one job through its lifecycle
///
/// A failed fetch stops automatic polling; pressing Enter retries.
pub(crate) async fn watch_job(client: ApiClient, job_id: JobId, config: &Config) -> Result<()> {
    let source: Arc<dyn JobSource> = Arc::new(client);
    let mut subscription = JobWatcher::new(source, &config.watch).observe(job_id);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut last_progress = None;

    println!(
        "{}",
        format!("Watching job {} (Ctrl+C to stop)", job_id).dimmed()
    );

    loop {
        let state = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                subscription.cancel();
                println!("{}", "Stopped watching.".dimmed());
                return Ok(());
            }
            state = subscription.changed() => state,
        };

        let Some(state) = state else {
            return Ok(());
        };

        match state {
            WatchState::Idle | WatchState::Loading => {}
            WatchState::Polling(job) => {
                let progress = (job.status, job.progress_percent);
                if last_progress != Some(progress) {
                    last_progress = Some(progress);
                    println!(
                        "  {} {} {}",
                        timestamp(&chrono::Utc::now()).dimmed(),
                        colorize_status(job.status),
                        if job.progress_percent > 0 {
                            format!("{}%", job.progress_percent)
                        } else {
                            String::new()
                        }
                    );
                }
            }
            WatchState::Completed(job) => {
                println!(
                    "{} Job {} completed",
                    "✓".green(),
                    job.id.to_string().bold()
                );
            }
            WatchState::FetchingResults(_) => println!("{}", "Fetching results...".dimmed()),
            WatchState::ResultsReady { job, preview } => {
                println!();
                print_result_view(&ResultView::from_preview(&preview), job.id);
                return Ok(());
            }
            WatchState::ResultsError { job, failure } => {
                println!();
                print_result_view(&ResultView::unavailable(failure.message), job.id);
                return Ok(());
            }
            WatchState::Failed(job) => {
                println!("{} Job {} failed", "✗".red(), job.id.to_string().bold());
                anyhow::bail!(
                    "{}",
                    job.error_message
                        .unwrap_or_else(|| "The analysis failed".to_string())
                );
            }
            WatchState::Error { failure, .. } => {
                print_failure(&failure);
                println!("{}", "Press Enter to retry, Ctrl+C to quit.".dimmed());

                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        subscription.cancel();
                        return Ok(());
                    }
                    line = stdin.next_line() => {
                        // Closed stdin: nobody can retry
                        if line?.is_none() {
                            anyhow::bail!("Stopped watching job {}: {}", job_id, failure.message);
                        }
                    }
                }
                subscription.refresh();
            }
        }
    }
}

async fn preview_results(client: &ApiClient, job_id: JobId, plots_dir: Option<&Path>) -> Result<()> {
    let preview = client.get_result_preview(job_id).await?;
    let view = ResultView::from_preview(&preview);

    print_result_view(&view, job_id);

    let Some(dir) = plots_dir else {
        return Ok(());
    };

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for (tab, plot) in view.tabs().iter().zip(&preview.plots) {
        let bytes = plot
            .image_bytes()
            .with_context(|| format!("Plot '{}' is not valid base64", tab.title))?;
        let path = dir.join(&tab.file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} Saved {}", "✓".green(), path.display());
    }

    Ok(())
}

async fn download_results(client: &ApiClient, job_id: JobId, output: &Path) -> Result<()> {
    match download_archive(client, job_id, output).await {
        Ok(archive) => {
            println!(
                "{} Saved {} ({} bytes)",
                "✓".green(),
                archive.path.display(),
                archive.size
            );
            Ok(())
        }
        Err(failure) => {
            print_failure(&failure);
            anyhow::bail!("Download of job {} results failed", job_id)
        }
    }
}
