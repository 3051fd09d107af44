//! Decode worker message protocol.
//!
//! Requests and responses cross the worker boundary by value. Field names
//! serialize in camelCase so the JSON form matches what browser-side
//! consumers of the same protocol expect.

use serde::{Deserialize, Serialize};

use crate::coord::{ChunkCoordinate, WorldOrigin};
use crate::wire::{BlockSample, DecodedChunk};

/// Ask a worker to fetch and decode one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeRequest {
    pub chunk_x: i32,
    pub chunk_z: i32,
    /// Display scale at request time. Echoed back untouched.
    pub scale: f64,
    pub chunk_size: u32,
}

impl DecodeRequest {
    pub fn new(coord: ChunkCoordinate, scale: f64, chunk_size: u32) -> Self {
        Self {
            chunk_x: coord.x,
            chunk_z: coord.z,
            scale,
            chunk_size,
        }
    }

    pub fn coord(&self) -> ChunkCoordinate {
        ChunkCoordinate::new(self.chunk_x, self.chunk_z)
    }
}

/// Worker reply. Correlated with its request by coordinate, never by order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodeResponse {
    Loaded(LoadedChunk),
    Failed(FailedChunk),
}

impl DecodeResponse {
    pub fn coord(&self) -> ChunkCoordinate {
        match self {
            DecodeResponse::Loaded(l) => l.coord(),
            DecodeResponse::Failed(f) => f.coord(),
        }
    }
}

/// Successful decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub chunk_start_x: i32,
    pub chunk_start_z: i32,
    pub chunk_data: Vec<BlockSample>,
    pub scale: f64,
}

impl LoadedChunk {
    pub fn from_decoded(coord: ChunkCoordinate, chunk: DecodedChunk, scale: f64) -> Self {
        Self {
            chunk_x: coord.x,
            chunk_z: coord.z,
            chunk_start_x: chunk.origin.world_x,
            chunk_start_z: chunk.origin.world_z,
            chunk_data: chunk.blocks,
            scale,
        }
    }

    pub fn coord(&self) -> ChunkCoordinate {
        ChunkCoordinate::new(self.chunk_x, self.chunk_z)
    }

    pub fn into_decoded(self) -> (ChunkCoordinate, DecodedChunk) {
        let coord = self.coord();
        let chunk = DecodedChunk {
            origin: WorldOrigin {
                world_x: self.chunk_start_x,
                world_z: self.chunk_start_z,
            },
            blocks: self.chunk_data,
        };
        (coord, chunk)
    }
}

/// Fetch or decode failure for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub error: String,
}

impl FailedChunk {
    pub fn new(coord: ChunkCoordinate, error: impl ToString) -> Self {
        Self {
            chunk_x: coord.x,
            chunk_z: coord.z,
            error: error.to_string(),
        }
    }

    pub fn coord(&self) -> ChunkCoordinate {
        ChunkCoordinate::new(self.chunk_x, self.chunk_z)
    }
}
