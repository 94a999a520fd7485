// Data models
// Counter set and table rows.

pub mod counter;
pub mod table_row;

pub use counter::{
    CounterEvent, CounterSet, MetricDescriptor, MetricKind, APP_DB_ERRORS_TOTAL,
    APP_REQUESTS_TOTAL, APP_UP, RECOGNIZED,
};
pub use table_row::TableRow;
