//! HTTP surface: the evaluation upload and the collection query endpoints.
//!
//! | Route                   | Handler                      |
//! |-------------------------|------------------------------|
//! | `POST /upload-and-rank` | [`routes::upload_and_rank`]  |
//! | `POST /execute-query`   | [`routes::execute_query`]    |
//! | `GET /health`           | [`routes::health`]           |

pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use state::AppState;

/// Default request body limit: 25 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Build the router. `body_limit` caps the upload size in bytes.
pub fn router(state: AppState, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/upload-and-rank",
            post(routes::upload_and_rank).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/execute-query", post(routes::execute_query))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `addr` and serve `router` until the process is stopped.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await
}
