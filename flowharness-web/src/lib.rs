//! HTTP transport for flowharness sessions.
//!
//! Each request is a flat form that the session driver turns into one harness
//! call. Every protocol-level outcome, rejections included, answers `200` with
//! a `FlowResponse`; HTTP errors are reserved for unknown sessions and
//! unreadable requests.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

/// Build the API router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/commands", get(routes::commands::list))
        .route("/api/v1/sessions", post(routes::sessions::create))
        .route(
            "/api/v1/sessions/:id",
            get(routes::sessions::get_one).delete(routes::sessions::end),
        )
        .route(
            "/api/v1/sessions/:id/dispatch",
            post(routes::sessions::dispatch),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API until the process stops.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
