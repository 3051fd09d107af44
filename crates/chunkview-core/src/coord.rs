//! Chunk-grid coordinates and the resource naming scheme built on them.
//!
//! A `ChunkCoordinate` addresses a chunk in chunk-grid space, not block space.
//! Its canonical text form `"x,z"` is the deduplication key used throughout
//! the pipeline and the path segment format used by the API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chunk indices on the XZ plane. Either axis may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoordinate {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoordinate {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Relative resource path for this chunk: `chunks/chunk.<x>.<z>.dat`.
    pub fn resource_path(&self) -> String {
        format!("chunks/{}", self.file_name())
    }

    /// File name component only, as stored on disk by the chunk exporter.
    pub fn file_name(&self) -> String {
        format!("chunk.{}.{}.dat", self.x, self.z)
    }

    /// World-space origin a chunk at this coordinate is expected to carry.
    ///
    /// Saturates instead of overflowing for coordinates near the i32 edges.
    pub fn expected_origin(&self, chunk_size: u32) -> WorldOrigin {
        let size = i32::try_from(chunk_size).unwrap_or(i32::MAX);
        WorldOrigin {
            world_x: self.x.saturating_mul(size),
            world_z: self.z.saturating_mul(size),
        }
    }

    /// Chunk containing the given world-space block position.
    pub fn containing(world_x: f64, world_z: f64, chunk_size: u32) -> Self {
        let size = f64::from(chunk_size.max(1));
        Self {
            x: (world_x / size).floor() as i32,
            z: (world_z / size).floor() as i32,
        }
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chunk coordinate {0:?}: expected \"x,z\"")]
pub struct CoordParseError(pub String);

impl FromStr for ChunkCoordinate {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, z) = s
            .split_once(',')
            .ok_or_else(|| CoordParseError(s.to_string()))?;
        let x = x.trim().parse().map_err(|_| CoordParseError(s.to_string()))?;
        let z = z.trim().parse().map_err(|_| CoordParseError(s.to_string()))?;
        Ok(Self { x, z })
    }
}

/// World-space anchor of a chunk, read from the payload header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldOrigin {
    pub world_x: i32,
    pub world_z: i32,
}

impl fmt::Display for WorldOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.world_x, self.world_z)
    }
}
