use std::path::Path;

use pkgidx_registry::{fetch_packages, FetchSelection};
use tracing::info;

use crate::{
    context::create_context,
    error::{CliError, CliResult},
};

pub fn fetch(
    base_url: Option<String>,
    selection: FetchSelection,
    output: &Path,
) -> CliResult<()> {
    let (ctx, progress_guard) = create_context();

    let mut repo = ctx.config().repository.clone();
    if base_url.is_some() {
        repo.base_url = base_url;
    }

    let result = fetch_packages(&repo, &selection, output, ctx.events());

    drop(ctx);
    if let Some(guard) = progress_guard {
        guard.finish();
    }
    crate::progress::stop();

    let report = result?;
    info!(
        "Fetched {} of {} file(s) into {}",
        report.fetched.len(),
        report.total(),
        output.display()
    );

    if report.has_failures() {
        return Err(CliError::BatchFailed {
            failed: report.failed.len(),
            total: report.total(),
        });
    }
    Ok(())
}
