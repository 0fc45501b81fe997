use std::sync::Arc;

use pkgidx_config::config::get_config;
use pkgidx_events::{ChannelSink, EventSinkHandle, NullSink};
use pkgidx_operations::IndexContext;

use crate::{
    progress::{spawn_event_handler, ProgressGuard},
    utils::progress_enabled,
};

/// Builds the operation context from the loaded config. With progress
/// enabled, events feed the progress thread behind the returned guard.
pub fn create_context() -> (IndexContext, Option<ProgressGuard>) {
    let config = get_config();

    if progress_enabled() {
        let (sink, receiver) = ChannelSink::new();
        let events: EventSinkHandle = Arc::new(sink);
        let ctx = IndexContext::new(config, events);
        let guard = spawn_event_handler(receiver);
        (ctx, Some(guard))
    } else {
        let events: EventSinkHandle = Arc::new(NullSink);
        let ctx = IndexContext::new(config, events);
        (ctx, None)
    }
}
