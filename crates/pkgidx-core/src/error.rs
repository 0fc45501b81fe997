//! Error types for pkgidx-core.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Invalid field-boundary pattern `{pattern}`")]
    #[diagnostic(
        code(pkgidx_core::boundary::pattern),
        help("Fix `boundary.fallback_pattern` or set `boundary.fallback = false`")
    )]
    InvalidBoundaryPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Field `{field}` is listed as both long-form and list-form")]
    #[diagnostic(
        code(pkgidx_core::normalize::conflicting_class),
        help("Remove `{field}` from one of the two field lists")
    )]
    ConflictingFieldClass { field: String },

    #[error(transparent)]
    #[diagnostic(
        code(pkgidx_core::json),
        help("The index file may be corrupt. Regenerate it with `pkgidx parse`")
    )]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
