use std::path::Path;

use pkgidx_operations::{query_packages, IndexSelector};

use crate::error::CliResult;

/// Prints the matching records as a JSON array on stdout.
pub fn query(data_root: &Path, selector: &IndexSelector, package: Option<&str>) -> CliResult<()> {
    let records = query_packages(data_root, selector, package)?.into_records();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
