//! Result archive download

use popstruct_client::{ClientError, ErrorKind};
use popstruct_core::domain::job::JobId;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::source::JobSource;
use crate::state::WatchFailure;

/// Archive written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    pub size: usize,
}

/// Downloads the result archive of `job_id` into `dir`
///
/// The file is named `job_<id>_results.zip`. Failures are returned as a
/// [`WatchFailure`] so callers can show them next to the job without
/// touching its observed state; nothing is retried.
pub async fn download_archive(
    source: &dyn JobSource,
    job_id: JobId,
    dir: &Path,
) -> Result<DownloadedArchive, WatchFailure> {
    let archive = source.download_archive(job_id).await.map_err(|e| {
        warn!("Failed to download results of job {}: {}", job_id, e);
        download_failure(&e)
    })?;

    let path = dir.join(&archive.file_name);
    let write_failure = |e: std::io::Error| {
        WatchFailure::new(
            ErrorKind::Unexpected,
            format!("Failed to write {}: {}", path.display(), e),
        )
    };
    tokio::fs::create_dir_all(dir).await.map_err(write_failure)?;
    tokio::fs::write(&path, &archive.bytes)
        .await
        .map_err(write_failure)?;

    info!(
        "Saved results of job {} to {} ({} bytes)",
        job_id,
        path.display(),
        archive.size()
    );

    Ok(DownloadedArchive {
        path,
        size: archive.size(),
    })
}

/// Archives the backend has not produced yet get a download-specific message
///
/// Every other failure, including a missing job or a refused request, keeps
/// its own classification.
fn download_failure(err: &ClientError) -> WatchFailure {
    match err {
        ClientError::NotReady(message) => WatchFailure::new(
            ErrorKind::ResourceNotReady,
            format!("Results are not available yet: {}", message),
        ),
        other => WatchFailure::from(other),
    }
}
