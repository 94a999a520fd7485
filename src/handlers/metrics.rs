// Metrics endpoint for Prometheus
// Re-exposes the persisted counters without counting the scrape itself.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::services::metrics_renderer;

/// Prometheus metrics endpoint
///
/// Returns the three recognised counters with `# HELP` and `# TYPE` lines.
pub async fn get_prometheus_metrics(State(state): State<AppState>) -> Response {
    let counters = state.counters.snapshot().await;

    (
        [(header::CONTENT_TYPE, metrics_renderer::CONTENT_TYPE)],
        metrics_renderer::render_exposition(&counters),
    )
        .into_response()
}
