//! chunkview integration test harness.
//!
//! Tests run in-process against real localhost sockets: a static chunk
//! server built from encoded fixture files, the HTTP fetcher, the decode
//! pool, the coordinator and the API router.
//!
//!   cargo test --test integration
//!
//! Every server binds port 0, so tests can run in parallel.

mod api;
mod fetch;
mod pipeline;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;

use chunkview_core::{BlockSample, ChunkCodec, ChunkCoordinate, RecordProfile};
use chunkview_services::{
    CameraCommand, ChunkFetcher, ChunkStore, Coordinator, DecodePool, ViewerState, ViewerStatus,
    WorkerSettings,
};

// ── Harness ───────────────────────────────────────────────────────────────────

pub const CHUNK_SIZE: u32 = 16;

/// Encode a chunk with the expected origin and a recognisable pattern:
/// height `localX`, type `localZ`.
pub fn encode_chunk(coord: ChunkCoordinate, profile: RecordProfile) -> Vec<u8> {
    let codec = ChunkCodec::new(CHUNK_SIZE, profile);
    let blocks: Vec<BlockSample> = (0..CHUNK_SIZE * CHUNK_SIZE)
        .map(|i| BlockSample {
            local_x: i % CHUNK_SIZE,
            local_z: i / CHUNK_SIZE,
            height: (i % CHUNK_SIZE) as u8,
            block_type_code: i / CHUNK_SIZE,
        })
        .collect();
    codec
        .encode(coord.expected_origin(CHUNK_SIZE), &blocks)
        .expect("fixture chunk encodes")
}

/// Scratch directory under the system temp dir, removed on drop.
pub struct ScratchDir {
    pub path: PathBuf,
}

impl ScratchDir {
    pub fn new() -> Result<Self> {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "chunkview-it-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Static chunk host.
///
/// `/chunks/<file>` serves the fixture directory. `/teapot/chunks/<file>`
/// always answers 418, for exercising non-success statuses.
pub struct ChunkServer {
    pub addr: SocketAddr,
    pub dir: ScratchDir,
    task: JoinHandle<()>,
}

impl ChunkServer {
    pub async fn start(chunks: &[(ChunkCoordinate, Vec<u8>)]) -> Result<Self> {
        let dir = ScratchDir::new()?;
        for (coord, bytes) in chunks {
            std::fs::write(dir.path.join(coord.file_name()), bytes)?;
        }

        let app = Router::new()
            .nest_service("/chunks", ServeDir::new(&dir.path))
            .route(
                "/teapot/chunks/{file}",
                get(|| async { StatusCode::IM_A_TEAPOT }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, dir, task })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn teapot_url(&self) -> String {
        format!("http://{}/teapot/", self.addr)
    }
}

impl Drop for ChunkServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A localhost URL nothing is listening on.
pub async fn closed_port_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/", addr))
}

/// Poll `check` every 10ms until it holds or `timeout` elapses.
pub async fn wait_for<F>(timeout: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("condition not met within {:?}", timeout)
}

/// A running decode pool + coordinator feeding a [`ChunkStore`].
pub struct Pipeline {
    pub store: ChunkStore,
    pub status: watch::Receiver<ViewerStatus>,
    pub camera: mpsc::Sender<CameraCommand>,
    pub shutdown: broadcast::Sender<()>,
    pub task: JoinHandle<Result<()>>,
}

impl Pipeline {
    pub fn start<F: ChunkFetcher>(
        fetcher: F,
        state: ViewerState,
        settings: WorkerSettings,
        workers: usize,
        max_concurrent_loads: usize,
    ) -> Self {
        let pool = DecodePool::spawn(Arc::new(fetcher), settings, workers, max_concurrent_loads);
        let (requests, responses) = pool.into_channels();
        let (camera, camera_rx) = mpsc::channel(16);
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let store = ChunkStore::new();

        let coordinator = Coordinator::new(
            state,
            CHUNK_SIZE,
            max_concurrent_loads,
            requests,
            responses,
            camera_rx,
            store.clone(),
            shutdown_rx,
            Duration::from_millis(10),
        );
        let status = coordinator.status();
        let task = tokio::spawn(coordinator.run());

        Self {
            store,
            status,
            camera,
            shutdown,
            task,
        }
    }

    pub fn stats(&self) -> chunkview_services::QueueStats {
        self.status.borrow().queue
    }

    /// Wait until nothing is queued or loading and at least `settled` chunks
    /// have reached a terminal state.
    pub async fn settle(&self, settled: usize) -> Result<()> {
        wait_for(Duration::from_secs(10), || {
            let q = self.stats();
            q.queued == 0 && q.loading == 0 && q.resident + q.failed >= settled
        })
        .await
    }

    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task.await?
    }
}
