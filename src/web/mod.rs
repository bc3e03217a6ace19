//! Web front end: JSON query endpoint plus a small HTML page.

mod page;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::QueryEngine;

/// Shared read-only state. The table never changes after load, so handlers
/// read it without locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
}

impl AppState {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/query", post(routes::handle_query))
        .route("/companies", get(routes::companies))
        .route("/years", get(routes::years))
        .route("/health", get(routes::health))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving on http://{}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
