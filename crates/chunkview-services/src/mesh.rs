//! Top-down quad mesh for decoded chunks.
//!
//! Each block becomes a unit square in world space at
//! `(origin + local)`, split into two triangles (six vertices), coloured by
//! [`block_color`]. Height does not displace the quad.

use serde::Serialize;

use chunkview_core::DecodedChunk;

use crate::palette::{block_color, Rgba};

pub const VERTICES_PER_BLOCK: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuadMesh {
    pub positions: Vec<[f32; 2]>,
    pub colors: Vec<Rgba>,
}

impl QuadMesh {
    pub fn from_chunk(chunk: &DecodedChunk) -> Self {
        let mut mesh = Self::default();
        mesh.append_chunk(chunk);
        mesh
    }

    pub fn append_chunk(&mut self, chunk: &DecodedChunk) {
        self.positions.reserve(chunk.blocks.len() * VERTICES_PER_BLOCK);
        self.colors.reserve(chunk.blocks.len() * VERTICES_PER_BLOCK);

        for block in &chunk.blocks {
            let x0 = (i64::from(chunk.origin.world_x) + i64::from(block.local_x)) as f32;
            let z0 = (i64::from(chunk.origin.world_z) + i64::from(block.local_z)) as f32;
            let (x1, z1) = (x0 + 1.0, z0 + 1.0);

            self.positions.extend_from_slice(&[
                [x0, z0],
                [x1, z0],
                [x0, z1],
                [x0, z1],
                [x1, z0],
                [x1, z1],
            ]);
            let color = block_color(block.block_type_code);
            self.colors.extend(std::iter::repeat(color).take(VERTICES_PER_BLOCK));
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
