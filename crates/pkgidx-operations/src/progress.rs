use std::sync::atomic::{AtomicU64, Ordering};

use pkgidx_events::OperationId;

/// Generates a unique operation ID.
pub fn next_op_id() -> OperationId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
