use crate::config::Config;
use crate::observability::metrics::Metrics;
use crate::store::MemoryStore;

pub struct AppState {
    pub store: MemoryStore,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: MemoryStore::new(),
            metrics: Metrics::new(),
            config,
        }
    }
}
