//! HTTP API over a live synthetic pipeline.

use std::time::Duration;

use anyhow::Result;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use chunkview_api::ApiState;
use chunkview_core::config::VisibilityMode;
use chunkview_core::{ChunkCodec, ChunkCoordinate, RecordProfile};
use chunkview_services::{SyntheticFetcher, Viewport, ViewerState, WorkerSettings};

use crate::*;

struct ApiHarness {
    pipeline: Pipeline,
    base: String,
    client: reqwest::Client,
    _chunks: Option<ScratchDir>,
}

impl ApiHarness {
    async fn start(serve_dir: Option<ScratchDir>) -> Result<Self> {
        let state = ViewerState {
            viewport: Viewport::new(800, 600, 1.0),
            player_x: 0.0,
            player_z: 0.0,
            mode: VisibilityMode::Player,
            visible_range: 1,
        };
        let fetcher = SyntheticFetcher::new(ChunkCodec::new(CHUNK_SIZE, RecordProfile::Wide));
        let pipeline = Pipeline::start(fetcher, state, WorkerSettings::default(), 2, 3);

        let api_state = ApiState {
            status: pipeline.status.clone(),
            store: pipeline.store.clone(),
            camera_tx: pipeline.camera.clone(),
            shutdown_tx: pipeline.shutdown.clone(),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let dir = serve_dir.as_ref().map(|d| d.path.clone());
        tokio::spawn(async move {
            let _ = chunkview_api::serve_on(listener, api_state, dir.as_deref()).await;
        });

        Ok(Self {
            pipeline,
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            _chunks: serve_dir,
        })
    }

    async fn get(&self, path: &str) -> Result<(u16, Value)> {
        let resp = self.client.get(format!("{}{}", self.base, path)).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok((status, serde_json::from_str(&body).unwrap_or(Value::String(body))))
    }

    async fn post(&self, path: &str, body: Value) -> Result<(u16, Value)> {
        let resp = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok((status, serde_json::from_str(&body).unwrap_or(Value::String(body))))
    }
}

#[tokio::test]
async fn status_and_chunk_listing() {
    let h = ApiHarness::start(None).await.unwrap();
    h.pipeline.settle(9).await.unwrap();

    let (code, status) = h.get("/api/status").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(status["mode"], "player");
    assert_eq!(status["chunk_size"], 16);
    assert_eq!(status["queue"]["resident"], 9);
    assert_eq!(status["queue"]["max_concurrent_loads"], 3);
    assert_eq!(status["resident_chunks"], 9);
    assert_eq!(status["resident_blocks"], 9 * 256);
    assert_eq!(status["visible"]["min_chunk_x"], -1);

    let (code, list) = h.get("/api/chunks").await.unwrap();
    assert_eq!(code, 200);
    let chunks = list["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 9);
    assert_eq!(chunks[0]["x"], -1);
    assert_eq!(chunks[0]["origin_x"], -16);
}

#[tokio::test]
async fn chunk_detail_uses_worker_message_shape() {
    let h = ApiHarness::start(None).await.unwrap();
    h.pipeline.settle(9).await.unwrap();

    let (code, chunk) = h.get("/api/chunks/1/-1").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(chunk["chunkX"], 1);
    assert_eq!(chunk["chunkZ"], -1);
    assert_eq!(chunk["chunkStartX"], 16);
    assert_eq!(chunk["chunkStartZ"], -16);
    assert_eq!(chunk["scale"], 1.0);
    let data = chunk["chunkData"].as_array().unwrap();
    assert_eq!(data.len(), 256);
    assert_eq!(
        data[17],
        json!({"localX": 1, "localZ": 1, "height": 0, "blockTypeCode": 2})
    );

    let (code, _) = h.get("/api/chunks/40/40").await.unwrap();
    assert_eq!(code, 404);
}

#[tokio::test]
async fn chunk_mesh_has_six_vertices_per_block() {
    let h = ApiHarness::start(None).await.unwrap();
    h.pipeline.settle(9).await.unwrap();

    let (code, mesh) = h.get("/api/chunks/0/0/mesh").await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(mesh["vertex_count"], 256 * 6);
    assert_eq!(mesh["positions"].as_array().unwrap().len(), 256 * 6);
    assert_eq!(mesh["colors"].as_array().unwrap().len(), 256 * 6);
    assert_eq!(mesh["positions"][0], json!([0.0, 0.0]));
}

#[tokio::test]
async fn camera_commands_reach_the_coordinator() {
    let h = ApiHarness::start(None).await.unwrap();

    let (code, resp) = h.post("/api/camera/zoom", json!({"steps": 2})).await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(resp["accepted"]["kind"], "zoom");

    let (code, _) = h
        .post("/api/camera/pan", json!({"dx": 110.0, "dy": -55.0}))
        .await
        .unwrap();
    assert_eq!(code, 200);

    let (code, _) = h
        .post("/api/camera/player", json!({"x": 100.0, "z": -3.0}))
        .await
        .unwrap();
    assert_eq!(code, 200);

    wait_for(Duration::from_secs(5), || {
        let s = h.pipeline.status.borrow();
        s.player_x == 100.0 && s.viewport.offset_x < 0.0
    })
    .await
    .unwrap();

    let status = h.pipeline.status.borrow().clone();
    assert!((status.viewport.scale - 1.21).abs() < 1e-9);
    assert!((status.viewport.offset_x + 110.0 / 1.21).abs() < 1e-9);
    assert!((status.viewport.offset_y - 55.0 / 1.21).abs() < 1e-9);

    // Player chunk (6,-1) and its neighbours get streamed.
    wait_for(Duration::from_secs(5), || {
        h.pipeline.store.contains(ChunkCoordinate::new(6, -1))
    })
    .await
    .unwrap();

    let (code, _) = h
        .post("/api/camera/resize", json!({"width": 0, "height": 10}))
        .await
        .unwrap();
    assert_eq!(code, 400);

    let (code, resp) = h
        .post("/api/camera/mode", json!({"mode": "viewport"}))
        .await
        .unwrap();
    assert_eq!(code, 200);
    assert_eq!(resp["accepted"], json!({"kind": "set_mode", "mode": "viewport"}));
    wait_for(Duration::from_secs(5), || {
        h.pipeline.status.borrow().mode == VisibilityMode::Viewport
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn serve_dir_exposes_raw_chunk_files() {
    let dir = ScratchDir::new().unwrap();
    let coord = ChunkCoordinate::new(2, 3);
    let bytes = encode_chunk(coord, RecordProfile::Wide);
    std::fs::write(dir.path.join(coord.file_name()), &bytes).unwrap();

    let h = ApiHarness::start(Some(dir)).await.unwrap();
    let resp = h
        .client
        .get(format!("{}/chunks/chunk.2.3.dat", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn shutdown_stops_the_coordinator() {
    let h = ApiHarness::start(None).await.unwrap();
    let (code, resp) = h.post("/api/daemon/shutdown", json!({})).await.unwrap();
    assert_eq!(code, 200);
    assert_eq!(resp["message"], "Shutdown initiated");

    let result = tokio::time::timeout(Duration::from_secs(5), h.pipeline.task)
        .await
        .expect("coordinator did not stop");
    assert!(result.unwrap().is_ok());
}
