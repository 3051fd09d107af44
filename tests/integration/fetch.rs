//! HTTP fetcher against a real static server.

use std::time::Duration;

use chunkview_core::{ChunkCodec, ChunkCoordinate, RecordProfile};
use chunkview_services::{ChunkFetcher, FetchError, HttpChunkFetcher};

use crate::*;

#[tokio::test]
async fn fetches_exact_payload_bytes() {
    let coord = ChunkCoordinate::new(-3, 7);
    let bytes = encode_chunk(coord, RecordProfile::Wide);
    let server = ChunkServer::start(&[(coord, bytes.clone())]).await.unwrap();

    let fetcher = HttpChunkFetcher::new(&server.base_url(), Some(Duration::from_secs(5))).unwrap();
    let payload = fetcher.fetch(coord).await.unwrap();
    assert_eq!(payload.as_ref(), bytes.as_slice());

    let codec = ChunkCodec::new(CHUNK_SIZE, RecordProfile::Wide);
    let chunk = codec.decode(&payload).unwrap();
    assert!(codec.check_origin(coord, &chunk).is_ok());
    assert_eq!(chunk.origin.world_x, -48);
    assert_eq!(chunk.origin.world_z, 112);
}

#[tokio::test]
async fn missing_chunk_is_unavailable() {
    let server = ChunkServer::start(&[]).await.unwrap();
    let fetcher = HttpChunkFetcher::new(&server.base_url(), None).unwrap();

    let err = fetcher.fetch(ChunkCoordinate::new(0, 0)).await.unwrap_err();
    assert_eq!(err, FetchError::Unavailable { status: 404 });
}

#[tokio::test]
async fn error_status_is_unavailable() {
    let server = ChunkServer::start(&[]).await.unwrap();
    let fetcher = HttpChunkFetcher::new(&server.teapot_url(), None).unwrap();

    let err = fetcher.fetch(ChunkCoordinate::new(1, 1)).await.unwrap_err();
    assert_eq!(err, FetchError::Unavailable { status: 418 });
}

#[tokio::test]
async fn refused_connection_is_transport_failure() {
    let url = closed_port_url().await.unwrap();
    let fetcher = HttpChunkFetcher::new(&url, Some(Duration::from_secs(2))).unwrap();

    let err = fetcher.fetch(ChunkCoordinate::new(0, 0)).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }), "{:?}", err);
}
