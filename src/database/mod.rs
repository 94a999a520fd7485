use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::constants::data_source::TABLE_QUERY;
use crate::error::DataSourceError;
use crate::models::TableRow;

pub type DatabasePool = MySqlPool;

/// Where the page gets its rows from.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<TableRow>, DataSourceError>;
}

/// Build a lazily-connecting pool.
///
/// No connection is attempted here, so the server starts while the database
/// is down and each request reports the failure instead.
pub fn setup_database(config: &DatabaseConfig) -> DatabasePool {
    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        max_connections = config.max_connections,
        "Configuring database pool"
    );

    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .charset(&config.charset);

    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .acquire_timeout(config.acquire_timeout())
        .test_before_acquire(true)
        .connect_lazy_with(options)
}

/// Runs the fixed table query against MySQL.
#[derive(Clone)]
pub struct MySqlTableSource {
    pool: DatabasePool,
}

impl MySqlTableSource {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl TableSource for MySqlTableSource {
    async fn fetch_rows(&self) -> Result<Vec<TableRow>, DataSourceError> {
        let rows = sqlx::query(TABLE_QUERY).fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Fetched table rows");

        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &MySqlRow) -> Result<TableRow, DataSourceError> {
    let id = match row.try_get::<i64, _>("id") {
        Ok(id) => id,
        Err(_) => {
            let unsigned: u64 = row.try_get("id")?;
            i64::try_from(unsigned).map_err(|_| {
                DataSourceError::unavailable(format!("id {} out of range", unsigned))
            })?
        }
    };
    Ok(TableRow {
        id,
        name: decode_name(row),
    })
}

/// `name` as display text. NULL renders as an empty cell, numeric and binary
/// columns are shown as their text form.
fn decode_name(row: &MySqlRow) -> String {
    if let Ok(name) = row.try_get::<Option<String>, _>("name") {
        return name.unwrap_or_default();
    }
    if let Ok(Some(number)) = row.try_get::<Option<i64>, _>("name") {
        return number.to_string();
    }
    row.try_get::<Option<Vec<u8>>, _>("name")
        .ok()
        .flatten()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Fixed rows, for tests and local runs without a database.
#[derive(Debug, Clone, Default)]
pub struct StaticTableSource {
    result: Option<Result<Vec<TableRow>, DataSourceError>>,
}

impl StaticTableSource {
    pub fn with_rows(rows: Vec<TableRow>) -> Self {
        Self {
            result: Some(Ok(rows)),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Some(Err(DataSourceError::unavailable(message))),
        }
    }
}

#[async_trait]
impl TableSource for StaticTableSource {
    async fn fetch_rows(&self) -> Result<Vec<TableRow>, DataSourceError> {
        self.result.clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}
