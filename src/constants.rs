//! Application constants and configuration defaults.

/// Defaults applied when the matching environment variable is unset.
pub mod defaults {
    pub const ENVIRONMENT: &str = "development";

    /// Page listener port
    pub const PORT: u16 = 8080;

    /// Exporter listener port
    pub const METRICS_PORT: u16 = 9100;

    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub const LOG_LEVEL: &str = "info";

    pub const DB_PORT: u16 = 3306;

    pub const DB_CHARSET: &str = "utf8mb4";

    pub const DB_MAX_CONNECTIONS: u32 = 5;

    pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 3;

    pub const METRICS_FILE: &str = "/tmp/app_metrics.prom";

    pub const METRICS_PATH: &str = "/metrics";

    pub const COUNTER_FLUSH_INTERVAL_SECS: u64 = 5;
}

/// Data source constants
pub mod data_source {
    /// The one query the page runs.
    pub const TABLE_QUERY: &str = "SELECT * FROM test";
}

/// Exporter listener routes
pub mod exporter {
    pub const METRICS_ROUTE: &str = "/metrics";
}
