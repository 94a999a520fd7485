//! Router configuration.
//!
//! Two routers share one [`AppState`]: the page router sends every path to
//! the page handler, the exporter router serves only the annotated metrics.

use axum::{middleware::from_fn, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::constants::exporter::METRICS_ROUTE;
use crate::handlers;
use crate::middleware::request_logger_middleware;

/// Page listener: every method and path goes to the page handler.
///
/// No timeout layer: the handler bounds the data-source call itself.
pub fn build_page_router(app_state: AppState) -> Router {
    Router::new()
        .fallback(handlers::page_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_logger_middleware)),
        )
        .with_state(app_state)
}

/// Exporter listener: `GET /metrics` only.
pub fn build_exporter_router(app_state: AppState) -> Router {
    Router::new()
        .route(METRICS_ROUTE, get(handlers::get_prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
