//! Application state shared across all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::database::TableSource;
use crate::services::counters::CounterBackend;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Request counters, file-backed or shared
    pub counters: Arc<dyn CounterBackend>,
    /// Source of the `test` table rows
    pub table_source: Arc<dyn TableSource>,
}

impl AppState {
    pub fn new(
        config: Config,
        counters: Arc<dyn CounterBackend>,
        table_source: Arc<dyn TableSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            counters,
            table_source,
        }
    }
}
