//! chunkviewd: chunk streaming and decode daemon.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};

use chunkview_core::config::ViewerConfig;
use chunkview_services::{
    ChunkStore, Coordinator, DecodePool, HttpChunkFetcher, SyntheticFetcher, ViewerState,
    WorkerSettings,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = ViewerConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = ViewerConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        ViewerConfig::default()
    });
    tracing::info!(
        config = %ViewerConfig::file_path().display(),
        chunk_size = config.chunks.chunk_size,
        profile = ?config.chunks.record_profile,
        synthetic = config.source.synthetic,
        "chunkviewd starting"
    );

    // ── Decode workers ───────────────────────────────────────────────────────
    let settings = WorkerSettings {
        profile: config.chunks.record_profile,
        origin_check: config.chunks.origin_check,
    };
    let capacity = config.queue.max_concurrent_loads;
    let workers = config.queue.worker_count;

    let pool = if config.source.synthetic {
        let fetcher = SyntheticFetcher::new(config.chunks.codec());
        DecodePool::spawn(Arc::new(fetcher), settings, workers, capacity)
    } else {
        let fetcher =
            HttpChunkFetcher::new(&config.source.base_url, config.source.request_timeout())
                .context("failed to create chunk fetcher")?;
        tracing::info!(base_url = %config.source.base_url, "fetching chunks over HTTP");
        DecodePool::spawn(Arc::new(fetcher), settings, workers, capacity)
    };
    let (request_tx, response_rx) = pool.into_channels();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────
    let store = ChunkStore::new();
    let (camera_tx, camera_rx) = mpsc::channel(64);

    let coordinator = Coordinator::new(
        ViewerState::from_config(&config.viewport),
        config.chunks.chunk_size,
        config.queue.max_concurrent_loads,
        request_tx,
        response_rx,
        camera_rx,
        store.clone(),
        shutdown_tx.subscribe(),
        config.queue.tick_interval(),
    );
    let status = coordinator.status();
    let coordinator_task = tokio::spawn(coordinator.run());

    let stats_printer = {
        let status = status.clone();
        let store = store.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(10));
            loop {
                interval.tick().await;
                let snapshot = status.borrow().clone();
                tracing::info!(
                    resident = snapshot.queue.resident,
                    loading = snapshot.queue.loading,
                    queued = snapshot.queue.queued,
                    failed = snapshot.queue.failed,
                    stored_blocks = store.block_count(),
                    "load queue snapshot"
                );
            }
        })
    };

    let api_task = {
        let state = chunkview_api::ApiState {
            status,
            store,
            camera_tx,
            shutdown_tx: shutdown_tx.clone(),
        };
        let port = config.api.port;
        let serve_dir = config.api.serve_dir.clone();
        tokio::spawn(async move {
            if let Err(e) = chunkview_api::serve(state, port, serve_dir.as_deref()).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv()   => tracing::info!("shutting down"),
        r = coordinator_task     => tracing::error!("coordinator exited: {:?}", r),
        r = api_task             => tracing::error!("API task exited: {:?}", r),
        r = stats_printer        => tracing::error!("stats printer exited: {:?}", r),
    }

    Ok(())
}
