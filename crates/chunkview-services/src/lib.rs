//! chunkview-services: the streaming half of the viewer.
//!
//! Fetchers, the decode worker pool, the load queue, viewport tracking, the
//! coordinator that ties them together, and the render-side chunk store.

pub mod coordinator;
pub mod decode_worker;
pub mod fetcher;
pub mod load_queue;
pub mod mesh;
pub mod palette;
pub mod render;
pub mod viewport;

pub use coordinator::{CameraCommand, Coordinator, ViewerState, ViewerStatus};
pub use decode_worker::{
    fetch_and_decode, process_request, ChunkLoadError, DecodePool, WorkerSettings,
};
pub use fetcher::{ChunkFetcher, FetchError, HttpChunkFetcher, RawChunkPayload, SyntheticFetcher};
pub use load_queue::{LoadOutcome, LoadQueue, LoadState, QueueStats};
pub use mesh::QuadMesh;
pub use palette::{block_color, Rgba};
pub use render::{ChunkStore, RenderAdapter};
pub use viewport::{ChunkRange, Viewport, ViewportError, ViewportTracker};
