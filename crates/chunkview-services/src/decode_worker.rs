//! Decode workers: fetch + decode off the coordinator's task.
//!
//! Each worker pulls one [`DecodeRequest`] at a time from a shared request
//! channel, runs fetch then decode, and posts exactly one [`DecodeResponse`]
//! back. Any failure becomes a `DecodeResponse::Failed`; a worker only exits
//! when its request channel closes or nobody is listening for responses.
//!
//! With zero workers the pool runs in direct mode: every request gets its own
//! short-lived task, and concurrency is bounded by the load queue alone.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use chunkview_core::{
    ChunkCodec, DecodeError, DecodeRequest, DecodeResponse, DecodedChunk, FailedChunk, LoadedChunk,
    OriginCheck, RecordProfile,
};

use crate::fetcher::{ChunkFetcher, FetchError};

/// Decode policy shared by every worker in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerSettings {
    pub profile: RecordProfile,
    pub origin_check: OriginCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkLoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Fetch and decode one chunk, applying the origin policy.
pub async fn fetch_and_decode<F: ChunkFetcher>(
    fetcher: &F,
    settings: WorkerSettings,
    request: &DecodeRequest,
) -> Result<DecodedChunk, ChunkLoadError> {
    let coord = request.coord();
    let payload = fetcher.fetch(coord).await?;
    let codec = ChunkCodec::new(request.chunk_size, settings.profile);
    let chunk = codec.decode(&payload)?;

    if let Err(mismatch) = codec.check_origin(coord, &chunk) {
        match settings.origin_check {
            OriginCheck::Strict => return Err(mismatch.into()),
            OriginCheck::Lenient => tracing::warn!(
                chunk_x = coord.x,
                chunk_z = coord.z,
                error = %mismatch,
                "chunk origin mismatch, keeping header origin"
            ),
        }
    }

    Ok(chunk)
}

/// Turn one request into exactly one response.
pub async fn process_request<F: ChunkFetcher>(
    fetcher: &F,
    settings: WorkerSettings,
    request: DecodeRequest,
) -> DecodeResponse {
    let coord = request.coord();
    match fetch_and_decode(fetcher, settings, &request).await {
        Ok(chunk) => {
            tracing::debug!(
                chunk_x = coord.x,
                chunk_z = coord.z,
                blocks = chunk.blocks.len(),
                "chunk decoded"
            );
            DecodeResponse::Loaded(LoadedChunk::from_decoded(coord, chunk, request.scale))
        }
        Err(e) => {
            tracing::warn!(chunk_x = coord.x, chunk_z = coord.z, error = %e, "chunk load failed");
            DecodeResponse::Failed(FailedChunk::new(coord, e))
        }
    }
}

/// A running set of decode workers and the two channel ends that talk to it.
pub struct DecodePool {
    requests: mpsc::Sender<DecodeRequest>,
    responses: mpsc::Receiver<DecodeResponse>,
    tasks: Vec<JoinHandle<()>>,
}

impl DecodePool {
    /// Spawn `worker_count` workers (0 = direct mode) on the current runtime.
    ///
    /// `capacity` bounds both channels; size it to the load queue's
    /// concurrency cap so dispatch never finds the request channel full.
    pub fn spawn<F: ChunkFetcher>(
        fetcher: Arc<F>,
        settings: WorkerSettings,
        worker_count: usize,
        capacity: usize,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::channel(capacity.max(1));
        let (response_tx, response_rx) = mpsc::channel(capacity.max(1));

        let tasks = if worker_count == 0 {
            vec![tokio::spawn(direct_loop(
                fetcher,
                settings,
                request_rx,
                response_tx,
            ))]
        } else {
            let shared = Arc::new(Mutex::new(request_rx));
            (0..worker_count)
                .map(|id| {
                    tokio::spawn(worker_loop(
                        id,
                        fetcher.clone(),
                        settings,
                        shared.clone(),
                        response_tx.clone(),
                    ))
                })
                .collect()
        };

        tracing::info!(
            workers = worker_count,
            direct = worker_count == 0,
            ?settings,
            "decode pool started"
        );

        Self {
            requests: request_tx,
            responses: response_rx,
            tasks,
        }
    }

    /// Split into the request sender and the response receiver. Worker tasks
    /// keep running until the sender is dropped.
    pub fn into_channels(self) -> (mpsc::Sender<DecodeRequest>, mpsc::Receiver<DecodeResponse>) {
        (self.requests, self.responses)
    }

    pub fn worker_tasks(&self) -> usize {
        self.tasks.len()
    }
}

async fn worker_loop<F: ChunkFetcher>(
    id: usize,
    fetcher: Arc<F>,
    settings: WorkerSettings,
    requests: Arc<Mutex<mpsc::Receiver<DecodeRequest>>>,
    responses: mpsc::Sender<DecodeResponse>,
) {
    loop {
        let request = {
            let mut rx = requests.lock().await;
            rx.recv().await
        };
        let Some(request) = request else {
            tracing::debug!(worker = id, "request channel closed, decode worker exiting");
            return;
        };

        let response = process_request(fetcher.as_ref(), settings, request).await;
        if responses.send(response).await.is_err() {
            tracing::debug!(worker = id, "response receiver dropped, decode worker exiting");
            return;
        }
    }
}

async fn direct_loop<F: ChunkFetcher>(
    fetcher: Arc<F>,
    settings: WorkerSettings,
    mut requests: mpsc::Receiver<DecodeRequest>,
    responses: mpsc::Sender<DecodeResponse>,
) {
    while let Some(request) = requests.recv().await {
        let fetcher = fetcher.clone();
        let responses = responses.clone();
        tokio::spawn(async move {
            let response = process_request(fetcher.as_ref(), settings, request).await;
            let _ = responses.send(response).await;
        });
    }
    tracing::debug!("request channel closed, direct dispatcher exiting");
}
