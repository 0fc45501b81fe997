use std::path::PathBuf;

use pkgidx_core::{Collection, Record};

/// One input file and where its result goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Info about a file that was processed.
#[derive(Clone, Debug)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Records written, for parse jobs.
    pub records: Option<usize>,
}

/// Info about a file that could not be processed.
#[derive(Clone, Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: String,
}

/// Report returned after a batch completes. Both lists follow job order.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Answer to a package query.
#[derive(Clone, Debug)]
pub enum QueryResult {
    /// The first record whose `Package` matched the requested name.
    Single(Record),
    /// The whole index.
    All(Collection),
}

impl QueryResult {
    /// Records in response order; a single match becomes a one-element list.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            QueryResult::Single(record) => vec![record],
            QueryResult::All(collection) => collection.into_records(),
        }
    }
}
