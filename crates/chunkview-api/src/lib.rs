//! chunkview-api: HTTP control and status API for the chunkview daemon.

pub mod handlers;

use std::path::Path;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub use handlers::ApiState;

/// Build the router: JSON API under `/api`, and raw chunk files under
/// `/chunks` when `serve_dir` is set.
pub fn router(state: ApiState, serve_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/chunks", get(handlers::handle_chunk_list))
        .route("/chunks/{x}/{z}", get(handlers::handle_chunk))
        .route("/chunks/{x}/{z}/mesh", get(handlers::handle_chunk_mesh))
        .route("/camera/pan", post(handlers::handle_pan))
        .route("/camera/zoom", post(handlers::handle_zoom))
        .route("/camera/player", post(handlers::handle_player))
        .route("/camera/resize", post(handlers::handle_resize))
        .route("/camera/mode", post(handlers::handle_mode))
        .route("/daemon/shutdown", post(handlers::handle_shutdown))
        .with_state(state);

    let mut app = Router::new().nest("/api", api_routes);
    if let Some(dir) = serve_dir {
        app = app.nest_service("/chunks", ServeDir::new(dir));
    }
    app.layer(cors)
}

pub async fn serve(state: ApiState, port: u16, serve_dir: Option<&Path>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("failed to bind API port {}", port))?;
    serve_on(listener, state, serve_dir).await
}

/// Serve on an already-bound listener.
pub async fn serve_on(
    listener: TcpListener,
    state: ApiState,
    serve_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        serve_dir = ?serve_dir.map(|d| d.display().to_string()),
        "API listening"
    );
    axum::serve(listener, router(state, serve_dir)).await?;
    Ok(())
}
