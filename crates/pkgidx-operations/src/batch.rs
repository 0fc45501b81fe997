use std::sync::atomic::{AtomicU32, Ordering};

use pkgidx_events::{IndexEvent, JobKind, OperationId};
use pkgidx_utils::fs::{read_text, write_text};
use rayon::{
    iter::{IntoParallelRefIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use tracing::{debug, error, info};

use crate::{
    context::IndexContext,
    error::{OperationError, Result},
    progress::next_op_id,
    types::{BatchReport, FailedFile, Job, ProcessedFile},
};

/// Normalizes every job's input and writes the result to its output.
///
/// A file that cannot be read or written is reported in
/// [`BatchReport::failed`]; the other files are still processed.
pub fn normalize_files(ctx: &IndexContext, jobs: &[Job]) -> Result<BatchReport> {
    let normalizer = ctx.config().normalizer()?;

    run_batch(ctx, JobKind::Normalize, jobs, |_, job| {
        let text = read_text(&job.input)?;
        write_text(&job.output, &normalizer.normalize_text(&text))?;
        Ok(None)
    })
}

/// Parses every job's input into a JSON array of records.
///
/// With `normalize_first` the configured fields are normalized in memory
/// before parsing.
pub fn parse_files(ctx: &IndexContext, jobs: &[Job], normalize_first: bool) -> Result<BatchReport> {
    let normalizer = if normalize_first {
        Some(ctx.config().normalizer()?)
    } else {
        None
    };
    let parser = ctx.config().record_parser();
    let events = ctx.events();

    run_batch(ctx, JobKind::Parse, jobs, |op_id, job| {
        let mut text = read_text(&job.input)?;
        if let Some(normalizer) = &normalizer {
            text = normalizer.normalize_text(&text);
        }

        let collection = parser.parse(&text);
        let orphans = collection.orphan_count();
        if orphans > 0 {
            events.emit(IndexEvent::OrphanFields {
                op_id,
                input: job.input.clone(),
                records: orphans,
            });
        }

        write_text(&job.output, &collection.to_json_pretty()?)?;
        Ok(Some(collection.len()))
    })
}

fn run_batch<F>(ctx: &IndexContext, kind: JobKind, jobs: &[Job], work: F) -> Result<BatchReport>
where
    F: Fn(OperationId, &Job) -> Result<Option<usize>> + Sync,
{
    let workers = ctx.config().parallel_limit();
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| OperationError::ThreadPool(err.to_string()))?;

    let events = ctx.events();
    let total = jobs.len() as u32;
    let completed = AtomicU32::new(0);
    let failed_count = AtomicU32::new(0);

    debug!(
        kind = kind.as_str(),
        files = jobs.len(),
        workers,
        "starting batch"
    );

    let results: Vec<std::result::Result<Option<usize>, String>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let op_id = next_op_id();
                events.emit(IndexEvent::FileStarted {
                    op_id,
                    kind,
                    input: job.input.clone(),
                });

                let result = work(op_id, job);
                match &result {
                    Ok(records) => {
                        events.emit(IndexEvent::FileProcessed {
                            op_id,
                            kind,
                            input: job.input.clone(),
                            output: job.output.clone(),
                            records: *records,
                        });
                    }
                    Err(err) => {
                        error!("Failed to {} {}: {}", kind.as_str(), job.input.display(), err);
                        events.emit(IndexEvent::FileFailed {
                            op_id,
                            kind,
                            input: job.input.clone(),
                            error: err.to_string(),
                        });
                        failed_count.fetch_add(1, Ordering::Relaxed);
                    }
                }

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                events.emit(IndexEvent::BatchProgress {
                    completed: done,
                    total,
                    failed: failed_count.load(Ordering::Relaxed),
                });

                result.map_err(|err| err.to_string())
            })
            .collect()
    });

    let mut report = BatchReport::default();
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(records) => {
                report.processed.push(ProcessedFile {
                    input: job.input.clone(),
                    output: job.output.clone(),
                    records,
                })
            }
            Err(error) => {
                report.failed.push(FailedFile {
                    input: job.input.clone(),
                    error,
                })
            }
        }
    }

    info!(
        "{}: {} processed, {} failed",
        kind.as_str(),
        report.processed.len(),
        report.failed.len()
    );
    Ok(report)
}
