//! Dataset command handlers
//!
//! Listing, upload and deletion of genotype datasets. Bulk deletion works on
//! the datasets of one listing page and always asks for confirmation unless
//! `--yes` is given.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use popstruct_client::ApiClient;
use popstruct_core::domain::dataset::DatasetId;
use popstruct_core::domain::page::DatasetPage;
use popstruct_core::dto::dataset::UploadDataset;
use popstruct_watch::{DatasetSelection, DeletionRequest};
use std::path::{Path, PathBuf};

use super::prompt::confirm;
use crate::config::Config;
use crate::render::{print_dataset_details, print_dataset_summary, print_failure};

/// Dataset subcommands
#[derive(Subcommand)]
pub enum DatasetCommands {
    /// List datasets
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page (defaults to POPSTRUCT_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Get dataset details
    Get { id: DatasetId },
    /// Upload a VCF, CSV or TXT genotype file
    Upload {
        /// File to upload (.vcf, .vcf.gz, .csv, .txt; at most 100 MB)
        file: PathBuf,

        /// Dataset name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete datasets shown on one listing page
    Delete {
        /// Dataset IDs to delete
        ids: Vec<DatasetId>,

        /// Select every dataset on the page
        #[arg(long, conflicts_with = "ids")]
        all_on_page: bool,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long)]
        page_size: Option<u32>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn handle_dataset_command(command: DatasetCommands, config: &Config) -> Result<()> {
    let client = config.client();
    let default_page_size = config.watch.page_size;

    match command {
        DatasetCommands::List { page, page_size } => {
            list_datasets(&client, page, page_size.unwrap_or(default_page_size)).await
        }
        DatasetCommands::Get { id } => {
            let dataset = client.get_dataset(id).await?;
            print_dataset_details(&dataset);
            Ok(())
        }
        DatasetCommands::Upload {
            file,
            name,
            description,
        } => upload_dataset(&client, &file, name, description).await,
        DatasetCommands::Delete {
            ids,
            all_on_page,
            page,
            page_size,
            yes,
        } => {
            delete_datasets(
                &client,
                ids,
                all_on_page,
                page,
                page_size.unwrap_or(default_page_size),
                yes,
            )
            .await
        }
    }
}

async fn list_datasets(client: &ApiClient, page: u32, page_size: u32) -> Result<()> {
    let listing = client.list_datasets(page, page_size).await?;
    print_listing(&listing, &DatasetSelection::new());
    Ok(())
}

fn print_listing(listing: &DatasetPage, selection: &DatasetSelection) {
    if listing.datasets.is_empty() {
        println!("{}", "No datasets found.".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "Datasets (page {} of {}, {} total):",
            listing.page,
            listing.total_pages(),
            listing.total
        )
        .bold()
    );
    println!();
    for dataset in &listing.datasets {
        print_dataset_summary(dataset, selection.contains(dataset.id));
    }
}

async fn upload_dataset(
    client: &ApiClient,
    file: &Path,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file path: {}", file.display()))?
        .to_string();

    let content = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let request = UploadDataset {
        name: name.unwrap_or_else(|| default_dataset_name(&file_name)),
        file_name,
        content,
        description,
    };

    println!(
        "Uploading {} ({:.2} MB)...",
        request.file_name.cyan(),
        request.size_mb()
    );
    let dataset = client.upload_dataset(request).await?;

    println!("{} Dataset uploaded", "✓".green());
    print_dataset_details(&dataset);
    Ok(())
}

/// "cohort.vcf.gz" -> "cohort"
fn default_dataset_name(file_name: &str) -> String {
    let lower = file_name.to_ascii_lowercase();
    for ext in [".vcf.gz", ".vcf", ".csv", ".txt"] {
        if lower.ends_with(ext) && lower.len() > ext.len() {
            return file_name[..file_name.len() - ext.len()].to_string();
        }
    }
    file_name.to_string()
}

async fn delete_datasets(
    client: &ApiClient,
    ids: Vec<DatasetId>,
    all_on_page: bool,
    page: u32,
    page_size: u32,
    yes: bool,
) -> Result<()> {
    let listing = client.list_datasets(page, page_size).await?;

    let mut selection = DatasetSelection::new();
    if all_on_page {
        selection.toggle_all(&listing);
    } else {
        for id in ids {
            if !listing.contains(id) {
                anyhow::bail!("Dataset {} is not on page {}", id, page);
            }
            if !selection.contains(id) {
                selection.toggle(id);
            }
        }
    }

    let Some(request) = DeletionRequest::new(&selection) else {
        println!("{}", "Nothing selected.".yellow());
        return Ok(());
    };

    print_listing(&listing, &selection);
    if !yes && !confirm(&request.prompt())? {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let outcome = request.confirm().execute(client, page, page_size).await;

    for (id, failure) in &outcome.failures {
        print!("  Dataset {}: ", id);
        print_failure(failure);
    }

    if outcome.is_success() {
        println!("{} {}", "✓".green(), outcome.summary());
    } else {
        println!("{} {}", "!".yellow(), outcome.summary().yellow());
    }

    match &outcome.listing {
        Ok(refreshed) => {
            selection.retain_page(refreshed);
            println!();
            print_listing(refreshed, &selection);
        }
        Err(e) => println!(
            "{}",
            format!("Could not refresh datasets: {}", e.user_message()).yellow()
        ),
    }

    if !outcome.is_success() {
        anyhow::bail!("{} dataset deletion(s) failed", outcome.failures.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_name() {
        assert_eq!(default_dataset_name("cohort.vcf.gz"), "cohort");
        assert_eq!(default_dataset_name("Panel.CSV"), "Panel");
        assert_eq!(default_dataset_name("notes"), "notes");
        assert_eq!(default_dataset_name(".vcf"), ".vcf");
    }
}
