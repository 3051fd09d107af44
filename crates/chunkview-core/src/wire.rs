//! Chunk payload wire format.
//!
//! A chunk payload is an 8-byte little-endian header followed by fixed-size
//! block records:
//!
//! ```text
//!   [0..4)   i32 LE  origin world X
//!   [4..8)   i32 LE  origin world Z
//!   [8..)    records, each `u8 height` + block type code
//! ```
//!
//! The width of the block type code is selected by a [`RecordProfile`]. The
//! canonical profile is [`RecordProfile::Wide`] (4-byte LE code, 5-byte
//! records). [`RecordProfile::Narrow`] (1-byte code, 2-byte records) exists for
//! exporters that emit the compact layout; it must be chosen explicitly and is
//! never guessed from the payload.
//!
//! Records are laid out row-major: record `i` sits at
//! `localX = i % chunkSize`, `localZ = i / chunkSize`.
//!
//! Everything in this module is pure. No I/O, no logging, no shared state.

use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;
use zerocopy::byteorder::{LittleEndian, I32, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::coord::{ChunkCoordinate, WorldOrigin};

// ── Layout ────────────────────────────────────────────────────────────────────

/// Payload header. Wire size: 8 bytes.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct PayloadHeader {
    pub origin_x: I32<LittleEndian>,
    pub origin_z: I32<LittleEndian>,
}

assert_eq_size!(PayloadHeader, [u8; 8]);

/// Block record in the canonical profile. Wire size: 5 bytes.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct WideRecord {
    pub height: u8,
    pub block_type: U32<LittleEndian>,
}

assert_eq_size!(WideRecord, [u8; 5]);

/// Block record in the compact profile. Wire size: 2 bytes.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct NarrowRecord {
    pub height: u8,
    pub block_type: u8,
}

assert_eq_size!(NarrowRecord, [u8; 2]);

/// Header length in bytes.
pub const HEADER_LEN: usize = 8;

/// Default chunk edge length in blocks.
pub const DEFAULT_CHUNK_SIZE: u32 = 16;

// ── Profiles ──────────────────────────────────────────────────────────────────

/// Width of the per-record block type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordProfile {
    /// 1 byte height + 4 byte LE type code.
    #[default]
    Wide,
    /// 1 byte height + 1 byte type code.
    Narrow,
}

impl RecordProfile {
    pub const fn record_size(self) -> usize {
        match self {
            RecordProfile::Wide => 5,
            RecordProfile::Narrow => 2,
        }
    }
}

/// What to do when a payload's header origin disagrees with its coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginCheck {
    /// Keep the chunk; the caller logs the mismatch.
    #[default]
    Lenient,
    /// Reject the chunk with [`DecodeError::OriginMismatch`].
    Strict,
}

// ── Decoded types ─────────────────────────────────────────────────────────────

/// One decoded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSample {
    pub local_x: u32,
    pub local_z: u32,
    pub height: u8,
    pub block_type_code: u32,
}

/// A fully decoded chunk. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedChunk {
    pub origin: WorldOrigin,
    pub blocks: Vec<BlockSample>,
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is {len} bytes, shorter than the {}-byte header", HEADER_LEN)]
    TooShort { len: usize },

    #[error("{trailing} trailing bytes do not form a whole {record_size}-byte record")]
    TruncatedRecord { trailing: usize, record_size: usize },

    #[error("payload holds {count} records, a {chunk_size}x{chunk_size} chunk holds at most {max}")]
    TooManyRecords {
        count: usize,
        max: usize,
        chunk_size: u32,
    },

    #[error("header origin {actual} does not match expected origin {expected}")]
    OriginMismatch {
        expected: WorldOrigin,
        actual: WorldOrigin,
    },

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("block type code {0} does not fit the narrow record profile")]
    TypeCodeOutOfRange(u32),

    #[error("{count} blocks exceed the chunk capacity of {max}")]
    TooManyBlocks { count: usize, max: usize },
}

// ── Codec ─────────────────────────────────────────────────────────────────────

/// Chunk payload codec for one chunk size and record profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCodec {
    chunk_size: u32,
    profile: RecordProfile,
}

impl ChunkCodec {
    pub const fn new(chunk_size: u32, profile: RecordProfile) -> Self {
        Self {
            chunk_size,
            profile,
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn profile(&self) -> RecordProfile {
        self.profile
    }

    /// Maximum number of records a payload may carry (`chunk_size²`).
    pub fn capacity(&self) -> usize {
        let size = self.chunk_size as usize;
        size.saturating_mul(size)
    }

    /// Decode a payload. Never returns partial data.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedChunk, DecodeError> {
        if self.chunk_size == 0 {
            return Err(DecodeError::ZeroChunkSize);
        }

        let header = PayloadHeader::read_from_prefix(bytes)
            .ok_or(DecodeError::TooShort { len: bytes.len() })?;
        let origin = WorldOrigin {
            world_x: header.origin_x.get(),
            world_z: header.origin_z.get(),
        };

        let body = &bytes[HEADER_LEN..];
        let record_size = self.profile.record_size();
        let trailing = body.len() % record_size;
        if trailing != 0 {
            return Err(DecodeError::TruncatedRecord {
                trailing,
                record_size,
            });
        }

        let count = body.len() / record_size;
        if count > self.capacity() {
            return Err(DecodeError::TooManyRecords {
                count,
                max: self.capacity(),
                chunk_size: self.chunk_size,
            });
        }

        let mut blocks = Vec::with_capacity(count);
        for (index, record) in body.chunks_exact(record_size).enumerate() {
            let (height, block_type_code) = self.read_record(record);
            blocks.push(BlockSample {
                local_x: index as u32 % self.chunk_size,
                local_z: index as u32 / self.chunk_size,
                height,
                block_type_code,
            });
        }

        Ok(DecodedChunk { origin, blocks })
    }

    /// Compare a decoded chunk's header origin with the origin its
    /// coordinate implies.
    pub fn check_origin(
        &self,
        coord: ChunkCoordinate,
        chunk: &DecodedChunk,
    ) -> Result<(), DecodeError> {
        let expected = coord.expected_origin(self.chunk_size);
        if chunk.origin == expected {
            Ok(())
        } else {
            Err(DecodeError::OriginMismatch {
                expected,
                actual: chunk.origin,
            })
        }
    }

    /// Encode an origin and a row-major block sequence.
    ///
    /// Block positions are implied by order; `local_x`/`local_z` are not
    /// written.
    pub fn encode(&self, origin: WorldOrigin, blocks: &[BlockSample]) -> Result<Vec<u8>, EncodeError> {
        if blocks.len() > self.capacity() {
            return Err(EncodeError::TooManyBlocks {
                count: blocks.len(),
                max: self.capacity(),
            });
        }

        let header = PayloadHeader {
            origin_x: I32::new(origin.world_x),
            origin_z: I32::new(origin.world_z),
        };
        let mut out = Vec::with_capacity(HEADER_LEN + blocks.len() * self.profile.record_size());
        out.extend_from_slice(header.as_bytes());

        for block in blocks {
            match self.profile {
                RecordProfile::Wide => {
                    let record = WideRecord {
                        height: block.height,
                        block_type: U32::new(block.block_type_code),
                    };
                    out.extend_from_slice(record.as_bytes());
                }
                RecordProfile::Narrow => {
                    let block_type = u8::try_from(block.block_type_code)
                        .map_err(|_| EncodeError::TypeCodeOutOfRange(block.block_type_code))?;
                    let record = NarrowRecord {
                        height: block.height,
                        block_type,
                    };
                    out.extend_from_slice(record.as_bytes());
                }
            }
        }

        Ok(out)
    }

    fn read_record(&self, record: &[u8]) -> (u8, u32) {
        // `record` is exactly `record_size` bytes, so these reads cannot miss.
        match self.profile {
            RecordProfile::Wide => WideRecord::read_from(record)
                .map(|r| (r.height, r.block_type.get()))
                .unwrap_or_default(),
            RecordProfile::Narrow => NarrowRecord::read_from(record)
                .map(|r| (r.height, u32::from(r.block_type)))
                .unwrap_or_default(),
        }
    }
}

impl Default for ChunkCodec {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, RecordProfile::Wide)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
