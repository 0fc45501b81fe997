use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use pkgidx_events::JobKind;
use pkgidx_utils::{fs::walk_dir, pattern::NameFilter};
use tracing::debug;

use crate::{context::IndexContext, error::Result, types::Job};

/// How the output file name is derived from the input file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputNaming {
    /// Prepend a fixed prefix, e.g. `Packages` -> `processed_Packages`.
    Prefix(String),
    /// Replace the extension, e.g. `Packages` -> `Packages.json`.
    Extension(String),
}

impl OutputNaming {
    fn output_name(&self, input: &Path) -> Option<PathBuf> {
        let file_name = input.file_name()?;
        match self {
            OutputNaming::Prefix(prefix) => {
                let mut name = OsString::from(prefix);
                name.push(file_name);
                Some(PathBuf::from(name))
            }
            OutputNaming::Extension(ext) => {
                let mut name = PathBuf::from(file_name);
                name.set_extension(ext);
                Some(name)
            }
        }
    }
}

/// Lists the files under `input` whose names pass `filter`, paired with
/// their output path under `output`.
///
/// Without `recursive` only direct children of `input` are considered. With
/// it the whole tree is walked and each file's relative directory is
/// recreated below `output`. Jobs come back sorted by input path.
pub fn discover_jobs(
    input: &Path,
    output: &Path,
    filter: &NameFilter,
    recursive: bool,
    naming: &OutputNaming,
) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();

    walk_dir(input, recursive, &mut |path: &Path| -> Result<()> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        if !filter.matches(name) {
            return Ok(());
        }

        let relative_dir = path
            .parent()
            .and_then(|parent| parent.strip_prefix(input).ok())
            .unwrap_or(Path::new(""));
        if let Some(out_name) = naming.output_name(path) {
            jobs.push(Job {
                input: path.to_path_buf(),
                output: output.join(relative_dir).join(out_name),
            });
        }
        Ok(())
    })?;

    jobs.sort_by(|a, b| a.input.cmp(&b.input));
    debug!("discovered {} file(s) under {}", jobs.len(), input.display());
    Ok(jobs)
}

/// Normalization jobs using the configured name prefix and output prefix.
pub fn normalize_jobs(
    ctx: &IndexContext,
    input: &Path,
    output: &Path,
    recursive: bool,
) -> Result<Vec<Job>> {
    let settings = &ctx.config().normalize;
    discover_jobs(
        input,
        output,
        &settings.name_filter(),
        recursive,
        &naming_for(JobKind::Normalize, settings.output_prefix()),
    )
}

/// Parse jobs using the configured name suffix.
pub fn parse_jobs(
    ctx: &IndexContext,
    input: &Path,
    output: &Path,
    recursive: bool,
) -> Result<Vec<Job>> {
    discover_jobs(
        input,
        output,
        &ctx.config().parse.name_filter(),
        recursive,
        &naming_for(JobKind::Parse, ""),
    )
}

fn naming_for(kind: JobKind, prefix: &str) -> OutputNaming {
    match kind {
        JobKind::Normalize => OutputNaming::Prefix(prefix.to_string()),
        JobKind::Parse => OutputNaming::Extension("json".to_string()),
    }
}
