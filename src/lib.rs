pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod grid;
pub mod health;
pub mod logging;
pub mod model;
pub mod state;
pub mod store;

pub use config::{CliArgs, ServerConfig};
pub use error::{ApiError, ClientError, GridError, StoreError, ValidationError};
pub use logging::{LoggingConfig, init_logging};
pub use model::{NewProduct, Product, ProductPatch};
pub use store::{JsonFileStore, ProductRepository};

use anyhow::Result;
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone())?);

    let catalog_size = state.store().list()?.len();
    tracing::info!(
        data_file = %config.data_file.display(),
        products = catalog_size,
        "starting product catalog server",
    );

    let app = api::router(state.clone()).merge(health::router(state));

    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolve on ctrl-c or SIGTERM so in-flight requests drain before exit.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => tracing::error!(%error, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
