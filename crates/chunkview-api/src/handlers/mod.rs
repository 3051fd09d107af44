//! HTTP API handlers: exposes viewer state as JSON and accepts camera input.

pub mod camera;
pub mod chunks;
pub mod status;

use axum::http::StatusCode;
use tokio::sync::{broadcast, mpsc, watch};

use chunkview_services::{CameraCommand, ChunkStore, ViewerStatus};

#[derive(Clone)]
pub struct ApiState {
    /// Latest coordinator snapshot.
    pub status: watch::Receiver<ViewerStatus>,
    pub store: ChunkStore,
    pub camera_tx: mpsc::Sender<CameraCommand>,
    /// Signals graceful daemon shutdown.
    pub shutdown_tx: broadcast::Sender<()>,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Forward a camera command to the coordinator.
async fn send_camera(state: &ApiState, command: CameraCommand) -> Result<(), (StatusCode, String)> {
    state.camera_tx.send(command).await.map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "coordinator is not running".to_string(),
        )
    })
}

pub use camera::{handle_mode, handle_pan, handle_player, handle_resize, handle_zoom};
pub use chunks::{handle_chunk, handle_chunk_list, handle_chunk_mesh};
pub use status::{handle_shutdown, handle_status};
