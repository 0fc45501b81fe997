use std::path::{Path, PathBuf};

use pkgidx_config::repository::RepositorySettings;
use pkgidx_dl::{
    download::Download,
    http_client::configure_http_client,
    types::{OverwriteMode, Progress},
};
use pkgidx_events::{EventSinkHandle, IndexEvent, OperationId};
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    plan::{plan_fetch, FetchSelection, FetchTarget},
};

#[derive(Clone, Debug)]
pub struct FetchedFile {
    pub target: FetchTarget,
    pub bytes: u64,
}

#[derive(Clone, Debug)]
pub struct FetchFailure {
    pub target: FetchTarget,
    pub error: String,
}

/// Outcome of [`fetch_packages`], one entry per planned target.
#[derive(Clone, Debug, Default)]
pub struct FetchReport {
    pub fetched: Vec<FetchedFile>,
    pub failed: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.fetched.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Downloads every `Packages` file selected by `selection` into `output`.
///
/// A failing download is recorded and the remaining targets are still
/// attempted.
pub fn fetch_packages(
    repo: &RepositorySettings,
    selection: &FetchSelection,
    output: &Path,
    events: &EventSinkHandle,
) -> Result<FetchReport> {
    let targets = plan_fetch(repo, selection, output, events)?;
    if targets.is_empty() {
        warn!("No valid codename/branch/architecture combination selected");
        return Ok(FetchReport::default());
    }

    let timeout = repo.timeout();
    configure_http_client(|cfg| cfg.timeout = Some(timeout));

    let mut report = FetchReport::default();
    for (idx, target) in targets.into_iter().enumerate() {
        let op_id = idx as OperationId + 1;
        match fetch_one(op_id, &target, events) {
            Ok(bytes) => {
                info!("Downloaded {}", target.path.display());
                report.fetched.push(FetchedFile {
                    target,
                    bytes,
                });
            }
            Err(err) => {
                warn!("Failed to download {}: {}", target.url, err);
                report.failed.push(FetchFailure {
                    target,
                    error: err,
                });
            }
        }
    }

    debug!(
        fetched = report.fetched.len(),
        failed = report.failed.len(),
        "fetch finished"
    );
    Ok(report)
}

fn fetch_one(
    op_id: OperationId,
    target: &FetchTarget,
    events: &EventSinkHandle,
) -> std::result::Result<u64, String> {
    events.emit(IndexEvent::FetchStarting {
        op_id,
        url: target.url.clone(),
        target: target.path.clone(),
    });

    let progress_events = events.clone();
    let result = Download::new(target.url.as_str())
        .output(PathBuf::from(&target.path))
        .overwrite(OverwriteMode::Force)
        .progress(move |progress| {
            let (current, total) = match progress {
                Progress::Starting {
                    total,
                } => (0, total),
                Progress::Chunk {
                    current,
                    total,
                } => (current, total),
                Progress::Complete {
                    total,
                } => (total, total),
            };
            progress_events.emit(IndexEvent::FetchProgress {
                op_id,
                current,
                total,
            });
        })
        .execute();

    match result {
        Ok(downloaded) => {
            events.emit(IndexEvent::FetchComplete {
                op_id,
                url: target.url.clone(),
                target: downloaded.path,
                bytes: downloaded.bytes,
            });
            Ok(downloaded.bytes)
        }
        Err(err) => {
            let error = err.to_string();
            events.emit(IndexEvent::FetchFailed {
                op_id,
                url: target.url.clone(),
                error: error.clone(),
            });
            Err(error)
        }
    }
}
