use std::path::PathBuf;

use crate::OperationId;

/// All event types emitted by pkgidx operations.
#[derive(Debug, Clone)]
pub enum IndexEvent {
    /// A file was picked up by a batch job.
    FileStarted {
        op_id: OperationId,
        kind: JobKind,
        input: PathBuf,
    },
    /// A file was processed and its output written.
    FileProcessed {
        op_id: OperationId,
        kind: JobKind,
        input: PathBuf,
        output: PathBuf,
        /// Number of records written, for parse jobs.
        records: Option<usize>,
    },
    /// A file could not be processed. The batch continues.
    FileFailed {
        op_id: OperationId,
        kind: JobKind,
        input: PathBuf,
        error: String,
    },
    /// Fields appeared before the first identity line of a file and were
    /// kept as a record of their own.
    OrphanFields {
        op_id: OperationId,
        input: PathBuf,
        records: usize,
    },
    /// Batch progress update.
    BatchProgress {
        completed: u32,
        total: u32,
        failed: u32,
    },
    /// A remote `Packages` file is being requested.
    FetchStarting {
        op_id: OperationId,
        url: String,
        target: PathBuf,
    },
    /// Bytes received so far for a fetch. `total` is 0 when unknown.
    FetchProgress {
        op_id: OperationId,
        current: u64,
        total: u64,
    },
    /// A remote file was stored.
    FetchComplete {
        op_id: OperationId,
        url: String,
        target: PathBuf,
        bytes: u64,
    },
    /// A remote file could not be fetched.
    FetchFailed {
        op_id: OperationId,
        url: String,
        error: String,
    },
    /// A requested repository value is not in the configured valid set.
    FetchSkipped {
        dimension: Dimension,
        value: String,
    },
}

/// Kind of work a batch performs on each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Normalize,
    Parse,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Normalize => "normalize",
            JobKind::Parse => "parse",
        }
    }
}

/// One axis of the repository layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Codename,
    Branch,
    Architecture,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Dimension::Codename => "codename",
            Dimension::Branch => "branch",
            Dimension::Architecture => "architecture",
        })
    }
}
