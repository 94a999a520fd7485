use axum::{
    extract::State,
    http::{header, Uri},
    response::{Html, IntoResponse, Response},
};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::error::DataSourceError;
use crate::models::CounterEvent;
use crate::services::{metrics_renderer, page_renderer};

/// Every request on the page listener lands here.
///
/// Counts the request, then answers either with bare metrics lines (when the
/// path is the configured metrics path) or with the `test` table. The counter
/// cycle is committed before the response is returned, and the status is
/// always 200. A data-source call that outlives `REQUEST_TIMEOUT` is reported
/// as a failure.
pub async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let mut cycle = state.counters.begin().await;
    cycle.record(CounterEvent::RequestReceived);

    if uri.path() == state.config.counters.metrics_path {
        let body = metrics_renderer::render_plain(&cycle.current());
        state.counters.commit(cycle).await;
        return ([(header::CONTENT_TYPE, metrics_renderer::CONTENT_TYPE)], body).into_response();
    }

    let timeout = Duration::from_secs(state.config.request_timeout);
    let fetched = tokio::time::timeout(timeout, state.table_source.fetch_rows())
        .await
        .unwrap_or_else(|_| {
            Err(DataSourceError::unavailable(format!(
                "query timed out after {}s",
                timeout.as_secs()
            )))
        });

    let body = match fetched {
        Ok(rows) => {
            debug!(rows = rows.len(), "Rendering table");
            cycle.record(CounterEvent::DataSourceSucceeded);
            page_renderer::render_table(&rows)
        }
        Err(e) => {
            warn!(error = %e, "Data source unavailable");
            cycle.record(CounterEvent::DataSourceFailed);
            page_renderer::render_failure(&e)
        }
    };

    state.counters.commit(cycle).await;
    Html(body).into_response()
}
