//! /chunks handlers: resident chunk listing, decoded data and meshes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use chunkview_core::{ChunkCoordinate, DecodedChunk, LoadedChunk};
use chunkview_services::QuadMesh;

use super::ApiState;

fn lookup(
    state: &ApiState,
    x: i32,
    z: i32,
) -> Result<(ChunkCoordinate, std::sync::Arc<DecodedChunk>), (StatusCode, String)> {
    let coord = ChunkCoordinate::new(x, z);
    state
        .store
        .get(coord)
        .map(|chunk| (coord, chunk))
        .ok_or((StatusCode::NOT_FOUND, format!("chunk {} is not resident", coord)))
}

// ── /chunks ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ChunkListResponse {
    pub chunks: Vec<ChunkSummary>,
}

#[derive(Serialize)]
pub struct ChunkSummary {
    pub x: i32,
    pub z: i32,
    pub origin_x: i32,
    pub origin_z: i32,
    pub blocks: usize,
}

pub async fn handle_chunk_list(State(state): State<ApiState>) -> Json<ChunkListResponse> {
    let chunks = state
        .store
        .coords()
        .into_iter()
        .filter_map(|coord| {
            let chunk = state.store.get(coord)?;
            Some(ChunkSummary {
                x: coord.x,
                z: coord.z,
                origin_x: chunk.origin.world_x,
                origin_z: chunk.origin.world_z,
                blocks: chunk.blocks.len(),
            })
        })
        .collect();

    Json(ChunkListResponse { chunks })
}

// ── /chunks/{x}/{z} ───────────────────────────────────────────────────────────

/// Same shape as a worker's success message.
pub async fn handle_chunk(
    State(state): State<ApiState>,
    Path((x, z)): Path<(i32, i32)>,
) -> Result<Json<LoadedChunk>, (StatusCode, String)> {
    let (coord, chunk) = lookup(&state, x, z)?;
    let scale = state.status.borrow().viewport.scale;
    Ok(Json(LoadedChunk::from_decoded(coord, (*chunk).clone(), scale)))
}

// ── /chunks/{x}/{z}/mesh ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeshResponse {
    pub x: i32,
    pub z: i32,
    pub vertex_count: usize,
    #[serde(flatten)]
    pub mesh: QuadMesh,
}

pub async fn handle_chunk_mesh(
    State(state): State<ApiState>,
    Path((x, z)): Path<(i32, i32)>,
) -> Result<Json<MeshResponse>, (StatusCode, String)> {
    let (coord, chunk) = lookup(&state, x, z)?;
    let mesh = QuadMesh::from_chunk(&chunk);
    Ok(Json(MeshResponse {
        x: coord.x,
        z: coord.z,
        vertex_count: mesh.vertex_count(),
        mesh,
    }))
}
