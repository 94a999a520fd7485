use std::net::SocketAddr;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;

use table_page::{router, startup, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (reads .env first)
    let config = Config::from_env()?;

    startup::init_tracing(&config);
    info!("Loaded configuration for environment: {}", config.environment);

    let app_state = startup::initialize_app(&config).await?;

    let page_app = router::build_page_router(app_state.clone());
    let exporter_app = router::build_exporter_router(app_state.clone());

    let page_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let exporter_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));

    let page_listener = tokio::net::TcpListener::bind(page_addr).await?;
    let exporter_listener = tokio::net::TcpListener::bind(exporter_addr).await?;
    info!("Serving page on {}", page_addr);
    info!("Serving metrics exporter on {}", exporter_addr);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let page_server = axum::serve(page_listener, page_app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()));
    let exporter_server = axum::serve(exporter_listener, exporter_app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx));

    futures::future::try_join(
        async { page_server.await },
        async { exporter_server.await },
    )
    .await?;

    app_state.counters.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Wait for SIGTERM or SIGINT signal for graceful shutdown
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
