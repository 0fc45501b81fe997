pub mod batch;
pub mod context;
pub mod discover;
pub mod error;
pub mod progress;
pub mod query;
pub mod types;

pub use batch::{normalize_files, parse_files};
pub use context::IndexContext;
pub use discover::{discover_jobs, normalize_jobs, parse_jobs, OutputNaming};
pub use error::{ErrorContext, OperationError, Result};
pub use query::{query_packages, IndexSelector};
pub use types::*;
