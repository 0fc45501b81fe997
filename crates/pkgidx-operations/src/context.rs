use pkgidx_config::config::Config;
use pkgidx_events::EventSinkHandle;

/// Everything a batch or query operation needs: the effective configuration
/// and the sink that receives its events.
#[derive(Clone)]
pub struct IndexContext {
    config: Config,
    events: EventSinkHandle,
}

impl IndexContext {
    pub fn new(config: Config, events: EventSinkHandle) -> Self {
        Self {
            config,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.events
    }
}
