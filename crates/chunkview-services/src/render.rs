//! Render adapter seam and the resident chunk store.
//!
//! The coordinator hands every successfully decoded chunk to a
//! [`RenderAdapter`] exactly once. [`ChunkStore`] is the stock adapter: a
//! concurrent map other tasks (the HTTP API, mesh builders) read from while
//! the coordinator writes.

use std::sync::Arc;

use dashmap::DashMap;

use chunkview_core::{ChunkCoordinate, DecodedChunk};

/// Consumer of decoded chunks.
pub trait RenderAdapter: Send + 'static {
    fn accept(&mut self, coord: ChunkCoordinate, chunk: DecodedChunk);
}

/// Decoded chunks keyed by coordinate. Clones share the same map.
#[derive(Clone, Default)]
pub struct ChunkStore {
    chunks: Arc<DashMap<ChunkCoordinate, Arc<DecodedChunk>>>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, coord: ChunkCoordinate, chunk: DecodedChunk) {
        self.chunks.insert(coord, Arc::new(chunk));
    }

    pub fn get(&self, coord: ChunkCoordinate) -> Option<Arc<DecodedChunk>> {
        self.chunks.get(&coord).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, coord: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Resident coordinates, sorted.
    pub fn coords(&self) -> Vec<ChunkCoordinate> {
        let mut coords: Vec<_> = self.chunks.iter().map(|entry| *entry.key()).collect();
        coords.sort();
        coords
    }

    /// Total decoded blocks across all resident chunks.
    pub fn block_count(&self) -> usize {
        self.chunks.iter().map(|entry| entry.value().blocks.len()).sum()
    }
}

impl RenderAdapter for ChunkStore {
    fn accept(&mut self, coord: ChunkCoordinate, chunk: DecodedChunk) {
        tracing::debug!(
            chunk_x = coord.x,
            chunk_z = coord.z,
            blocks = chunk.blocks.len(),
            "chunk resident"
        );
        self.insert(coord, chunk);
    }
}
