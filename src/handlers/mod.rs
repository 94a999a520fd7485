pub mod metrics;
pub mod page;

pub use metrics::get_prometheus_metrics;
pub use page::page_handler;
