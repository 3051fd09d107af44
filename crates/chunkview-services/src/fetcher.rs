//! Chunk fetchers: turn a coordinate into a raw payload.
//!
//! A fetcher never decodes. Transport failures and non-success responses are
//! reported as distinct [`FetchError`] variants so callers can tell a missing
//! chunk from a broken connection.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Url;

use chunkview_core::{BlockSample, ChunkCodec, ChunkCoordinate};

/// Payload bytes exactly as received for one chunk.
pub type RawChunkPayload = Bytes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("chunk unavailable: HTTP {status}")]
    Unavailable { status: u16 },

    #[error("transport failure: {cause}")]
    Transport { cause: String },
}

/// Source of raw chunk payloads.
///
/// `fetch` suspends the calling task until the payload arrives or fails.
pub trait ChunkFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        coord: ChunkCoordinate,
    ) -> impl Future<Output = Result<RawChunkPayload, FetchError>> + Send;
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

/// Fetches `chunks/chunk.<x>.<z>.dat` relative to a base URL.
#[derive(Clone)]
pub struct HttpChunkFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpChunkFetcher {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut normalized = base_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized)
            .with_context(|| format!("invalid chunk source URL: {}", base_url))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self { client, base })
    }

    /// Absolute URL for a chunk.
    pub fn url_for(&self, coord: ChunkCoordinate) -> Result<Url, FetchError> {
        self.base
            .join(&coord.resource_path())
            .map_err(|e| FetchError::Transport {
                cause: format!("bad chunk URL: {}", e),
            })
    }
}

impl ChunkFetcher for HttpChunkFetcher {
    async fn fetch(&self, coord: ChunkCoordinate) -> Result<RawChunkPayload, FetchError> {
        let url = self.url_for(coord)?;
        tracing::trace!(%url, chunk_x = coord.x, chunk_z = coord.z, "fetching chunk");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                cause: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unavailable {
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| FetchError::Transport {
            cause: e.to_string(),
        })
    }
}

// ── Synthetic ─────────────────────────────────────────────────────────────────

/// Generates a flat patterned chunk for any coordinate, without I/O.
///
/// Every block has height 0 and type `(localX + localZ) % 12`; the header
/// carries the coordinate's expected origin.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFetcher {
    codec: ChunkCodec,
}

impl SyntheticFetcher {
    pub fn new(codec: ChunkCodec) -> Self {
        Self { codec }
    }

    pub fn payload_for(&self, coord: ChunkCoordinate) -> Result<RawChunkPayload, FetchError> {
        let size = self.codec.chunk_size();
        let blocks: Vec<BlockSample> = (0..size.saturating_mul(size))
            .map(|i| {
                let local_x = i % size;
                let local_z = i / size;
                BlockSample {
                    local_x,
                    local_z,
                    height: 0,
                    block_type_code: (local_x + local_z) % 12,
                }
            })
            .collect();

        self.codec
            .encode(coord.expected_origin(size), &blocks)
            .map(Bytes::from)
            .map_err(|e| FetchError::Transport {
                cause: e.to_string(),
            })
    }
}

impl ChunkFetcher for SyntheticFetcher {
    async fn fetch(&self, coord: ChunkCoordinate) -> Result<RawChunkPayload, FetchError> {
        self.payload_for(coord)
    }
}
