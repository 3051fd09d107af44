//! /camera handlers: pan, zoom, player position, canvas size and visibility mode.
//!
//! Commands are queued to the coordinator; the response only confirms they
//! were accepted. Read /status to see the effect.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use chunkview_core::config::VisibilityMode;
use chunkview_services::CameraCommand;

use super::{send_camera, ApiState};

#[derive(Serialize)]
pub struct CameraResponse {
    pub accepted: CameraCommand,
}

async fn accept(
    state: &ApiState,
    command: CameraCommand,
) -> Result<Json<CameraResponse>, (StatusCode, String)> {
    send_camera(state, command).await?;
    Ok(Json(CameraResponse { accepted: command }))
}

fn finite(values: &[f64]) -> Result<(), (StatusCode, String)> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            "coordinates must be finite".to_string(),
        ))
    }
}

// ── /camera/pan ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PanRequest {
    /// Screen-space drag in pixels.
    pub dx: f64,
    pub dy: f64,
}

pub async fn handle_pan(
    State(state): State<ApiState>,
    Json(req): Json<PanRequest>,
) -> Result<Json<CameraResponse>, (StatusCode, String)> {
    finite(&[req.dx, req.dy])?;
    accept(&state, CameraCommand::Pan { dx: req.dx, dy: req.dy }).await
}

// ── /camera/zoom ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ZoomRequest {
    /// Positive zooms in.
    pub steps: i32,
}

pub async fn handle_zoom(
    State(state): State<ApiState>,
    Json(req): Json<ZoomRequest>,
) -> Result<Json<CameraResponse>, (StatusCode, String)> {
    accept(&state, CameraCommand::Zoom { steps: req.steps }).await
}

// ── /camera/player ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PlayerRequest {
    pub x: f64,
    pub z: f64,
}

pub async fn handle_player(
    State(state): State<ApiState>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<CameraResponse>, (StatusCode, String)> {
    finite(&[req.x, req.z])?;
    accept(&state, CameraCommand::MovePlayer { x: req.x, z: req.z }).await
}

// ── /camera/resize ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
}

pub async fn handle_resize(
    State(state): State<ApiState>,
    Json(req): Json<ResizeRequest>,
) -> Result<Json<CameraResponse>, (StatusCode, String)> {
    if req.width == 0 || req.height == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "canvas must have non-zero size".to_string(),
        ));
    }
    accept(
        &state,
        CameraCommand::Resize {
            width: req.width,
            height: req.height,
        },
    )
    .await
}

// ── /camera/mode ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: VisibilityMode,
}

pub async fn handle_mode(
    State(state): State<ApiState>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<CameraResponse>, (StatusCode, String)> {
    accept(&state, CameraCommand::SetMode { mode: req.mode }).await
}
