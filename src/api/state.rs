use crate::cache::LatestReadings;
use crate::config::Config;
use crate::db::Pool;
use crate::poller::Collectors;
use std::sync::Arc;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub cache: Arc<LatestReadings>,
    pub collectors: Collectors,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: Pool, cache: Arc<LatestReadings>, collectors: Collectors, config: Config) -> Self {
        Self {
            pool,
            cache,
            collectors,
            config: Arc::new(config),
        }
    }
}
