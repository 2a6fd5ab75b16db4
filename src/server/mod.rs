use axum::{
    Router,
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;
use crate::storage::SqliteStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<SqliteStore>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ask", get(routes::ask_query).post(routes::ask))
        .route("/health", get(routes::health))
        .route("/stats", get(routes::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
