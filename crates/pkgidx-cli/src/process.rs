use std::path::Path;

use nu_ansi_term::Color::Red;
use pkgidx_operations::{normalize_files, normalize_jobs, parse_files, parse_jobs, BatchReport};
use tracing::{info, warn};

use crate::{
    context::create_context,
    error::{CliError, CliResult},
    utils::Colored,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Normalize,
    Parse { normalize_first: bool },
}

pub fn process(action: Action, input: &Path, output: &Path, recursive: bool) -> CliResult<()> {
    let (ctx, progress_guard) = create_context();

    let result = match action {
        Action::Normalize => {
            normalize_jobs(&ctx, input, output, recursive)
                .and_then(|jobs| normalize_files(&ctx, &jobs))
        }
        Action::Parse {
            normalize_first,
        } => {
            parse_jobs(&ctx, input, output, recursive)
                .and_then(|jobs| parse_files(&ctx, &jobs, normalize_first))
        }
    };

    // Closing the channel lets the progress thread drain and exit.
    drop(ctx);
    if let Some(guard) = progress_guard {
        guard.finish();
    }
    crate::progress::stop();

    summarize(&result?, input)
}

fn summarize(report: &BatchReport, input: &Path) -> CliResult<()> {
    if report.total() == 0 {
        warn!("No matching files found in {}", input.display());
        return Ok(());
    }

    for failure in &report.failed {
        warn!(
            "{}: {}",
            failure.input.display(),
            Colored(Red, &failure.error)
        );
    }

    let records: usize = report.processed.iter().filter_map(|p| p.records).sum();
    if records > 0 {
        info!(
            "Processed {} file(s), {} record(s)",
            report.processed.len(),
            records
        );
    } else {
        info!("Processed {} file(s)", report.processed.len());
    }

    if report.has_failures() {
        return Err(CliError::BatchFailed {
            failed: report.failed.len(),
            total: report.total(),
        });
    }
    Ok(())
}
