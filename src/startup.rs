//! Application startup and initialization logic.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, CounterMode, LogFormat};
use crate::database::{self, MySqlTableSource, TableSource};
use crate::services::counters::{
    CounterBackend, CounterStore, FileCounterBackend, SharedCounterBackend,
};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured log level.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("table_page={0},tower_http={0}", config.log_level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Initialize the counter backend and data source and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!(environment = %config.environment, "Starting table page");

    let counters = initialize_counters(config).await;

    let pool = database::setup_database(&config.database);
    let table_source: Arc<dyn TableSource> = Arc::new(MySqlTableSource::new(pool));
    info!("Data source configured (connections open on first request)");

    Ok(AppState::new(config.clone(), counters, table_source))
}

/// Build the counter backend selected by `COUNTER_MODE`.
pub async fn initialize_counters(config: &Config) -> Arc<dyn CounterBackend> {
    let store = CounterStore::new(&config.counters.file);

    match config.counters.mode {
        CounterMode::File => {
            info!(path = %store.path().display(), "Counters: per-request file read/write");
            let backend: Arc<dyn CounterBackend> = Arc::new(FileCounterBackend::new(store));
            backend
        }
        CounterMode::Shared => {
            let backend = Arc::new(SharedCounterBackend::load(store).await);
            backend.spawn_flush_task(config.counters.flush_interval());
            info!(
                flush_interval_secs = config.counters.flush_interval_secs,
                "Counters: shared in-process atomics with periodic flush"
            );
            let backend: Arc<dyn CounterBackend> = backend;
            backend
        }
    }
}
