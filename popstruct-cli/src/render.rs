//! Terminal rendering shared by the command handlers

use chrono::{DateTime, Utc};
use colored::*;
use popstruct_core::domain::dataset::Dataset;
use popstruct_core::domain::job::{Job, JobStatus};
use popstruct_watch::{ResultView, WatchFailure};

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Colorize job status for display
pub fn colorize_status(status: JobStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        JobStatus::Pending => label.yellow(),
        JobStatus::Running => label.cyan(),
        JobStatus::Completed => label.green(),
        JobStatus::Failed => label.red(),
    }
}

/// Print a job summary line block
pub fn print_job_summary(job: &Job) {
    println!(
        "  {} Job {} {}",
        "▸".cyan(),
        job.id.to_string().bold(),
        job.name.dimmed()
    );
    println!("    Analysis: {}", job.analysis_type.label());
    println!("    Status:   {}", status_with_progress(job));
    println!(
        "    Dataset:  {}",
        job.dataset_name
            .clone()
            .unwrap_or_else(|| format!("#{}", job.dataset_id))
            .dimmed()
    );
    println!("    Created:  {}", timestamp(&job.created_at).dimmed());
    println!();
}

/// Print detailed job information
pub fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    println!("  Name:        {}", job.name);
    println!("  Analysis:    {}", job.analysis_type.label());
    println!("  Status:      {}", status_with_progress(job));
    println!(
        "  Dataset:     {} ({})",
        job.dataset_name.as_deref().unwrap_or("-"),
        job.dataset_id
    );
    println!("  Created:     {}", timestamp(&job.created_at));

    if let Some(started) = &job.started_at {
        println!("  Started:     {}", timestamp(started));
    }

    if let Some(completed) = &job.completed_at {
        println!("  Completed:   {}", timestamp(completed));
    }

    if let Some(duration) = job.duration() {
        println!("  Duration:    {}s", duration.num_seconds());
    }

    if !job.parameters.is_empty() {
        println!("\n{}", "Parameters:".bold());
        for (key, value) in &job.parameters {
            println!("  {} = {}", key.cyan(), value);
        }
    }

    if let Some(error) = &job.error_message {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

fn status_with_progress(job: &Job) -> String {
    match job.status {
        JobStatus::Running if job.progress_percent > 0 => {
            format!("{} ({}%)", colorize_status(job.status), job.progress_percent)
        }
        status => colorize_status(status).to_string(),
    }
}

pub fn print_dataset_summary(dataset: &Dataset, selected: bool) {
    let marker = if selected { "✓".red() } else { "▸".cyan() };
    println!(
        "  {} Dataset {} {}",
        marker,
        dataset.id.to_string().bold(),
        dataset.name
    );
    println!(
        "    Type: {}  Size: {:.2} MB",
        dataset.file_type, dataset.file_size_mb
    );
    if let (Some(samples), Some(variants)) = (dataset.n_samples, dataset.n_variants) {
        println!("    Samples: {}  Variants: {}", samples, variants);
    }
    println!("    Uploaded: {}", timestamp(&dataset.created_at).dimmed());
    println!();
}

pub fn print_dataset_details(dataset: &Dataset) {
    println!("{}", "Dataset Details:".bold());
    println!("  ID:          {}", dataset.id.to_string().cyan());
    println!("  Name:        {}", dataset.name);
    if let Some(description) = &dataset.description {
        println!("  Description: {}", description);
    }
    println!("  Type:        {}", dataset.file_type);
    println!("  Size:        {:.2} MB", dataset.file_size_mb);
    println!(
        "  Samples:     {}",
        dataset
            .n_samples
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Variants:    {}",
        dataset
            .n_variants
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Uploaded:    {}", timestamp(&dataset.created_at));
}

/// Print metric cards and plot tabs
pub fn print_result_view(view: &ResultView, job_id: i64) {
    match view {
        ResultView::Ready {
            cards,
            tabs,
            notice,
        } => {
            if !cards.is_empty() {
                println!("{}", "Metrics:".bold());
                let width = cards.iter().map(|c| c.label.len()).max().unwrap_or(0);
                for card in cards {
                    println!("  {:<width$}  {}", card.label, card.value.cyan(), width = width);
                }
            }

            if !tabs.is_empty() {
                println!("\n{}", "Plots:".bold());
                for tab in tabs {
                    println!(
                        "  [{}] {} {}",
                        tab.index + 1,
                        tab.title,
                        format!("({}, {})", tab.file_name, tab.media_type).dimmed()
                    );
                }
            }

            if let Some(notice) = notice {
                println!("\n{}", notice.yellow());
                print_download_hint(job_id);
            }
        }
        ResultView::Empty { message, hint } => {
            println!("{}", message.yellow());
            println!("{}", hint.dimmed());
            print_download_hint(job_id);
        }
    }
}

pub fn print_download_hint(job_id: i64) {
    println!(
        "  {}",
        format!("popstruct job download {}", job_id).dimmed()
    );
}

pub fn print_failure(failure: &WatchFailure) {
    println!("{} {}", "✗".red(), failure.message.red());
}
