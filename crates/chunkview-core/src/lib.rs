//! chunkview-core: coordinates, chunk wire format, worker protocol, config.
//! All other chunkview crates depend on this one.

pub mod config;
pub mod coord;
pub mod protocol;
pub mod wire;

pub use coord::{ChunkCoordinate, CoordParseError, WorldOrigin};
pub use protocol::{DecodeRequest, DecodeResponse, FailedChunk, LoadedChunk};
pub use wire::{
    BlockSample, ChunkCodec, DecodeError, DecodedChunk, EncodeError, OriginCheck, RecordProfile,
};
