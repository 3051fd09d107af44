//! End-to-end: static server → HTTP fetcher → decode pool → coordinator → store.

use std::time::Duration;

use chunkview_core::config::VisibilityMode;
use chunkview_core::{ChunkCodec, ChunkCoordinate, OriginCheck, RecordProfile, WorldOrigin};
use chunkview_services::{
    CameraCommand, HttpChunkFetcher, SyntheticFetcher, Viewport, ViewerState, WorkerSettings,
};

use crate::*;

fn player_state(radius: u32) -> ViewerState {
    ViewerState {
        viewport: Viewport::new(800, 600, 1.0),
        player_x: 8.0,
        player_z: 8.0,
        mode: VisibilityMode::Player,
        visible_range: radius,
    }
}

fn fixtures(coords: impl IntoIterator<Item = ChunkCoordinate>) -> Vec<(ChunkCoordinate, Vec<u8>)> {
    coords
        .into_iter()
        .map(|c| (c, encode_chunk(c, RecordProfile::Wide)))
        .collect()
}

#[tokio::test]
async fn missing_chunk_fails_without_blocking_neighbours() {
    let missing = ChunkCoordinate::new(1, -1);
    let present: Vec<_> = (-1..=1)
        .flat_map(|x| (-1..=1).map(move |z| ChunkCoordinate::new(x, z)))
        .filter(|c| *c != missing)
        .collect();
    let server = ChunkServer::start(&fixtures(present.iter().copied())).await.unwrap();

    let fetcher = HttpChunkFetcher::new(&server.base_url(), Some(Duration::from_secs(5))).unwrap();
    let pipeline = Pipeline::start(fetcher, player_state(1), WorkerSettings::default(), 2, 3);

    pipeline.settle(9).await.unwrap();
    let stats = pipeline.stats();
    assert_eq!(stats.resident, 8);
    assert_eq!(stats.failed, 1);
    assert_eq!(pipeline.store.len(), 8);
    assert!(!pipeline.store.contains(missing));

    let chunk = pipeline.store.get(ChunkCoordinate::new(-1, 1)).unwrap();
    assert_eq!(chunk.origin, WorldOrigin { world_x: -16, world_z: 16 });
    assert_eq!(chunk.blocks.len(), 256);
    let last = chunk.blocks[255];
    assert_eq!((last.local_x, last.local_z, last.height, last.block_type_code), (15, 15, 15, 15));

    pipeline.stop().await.unwrap();
}

#[tokio::test]
async fn direct_mode_loads_the_visible_viewport() {
    let visible: Vec<_> = (0..=2)
        .flat_map(|x| (0..=2).map(move |z| ChunkCoordinate::new(x, z)))
        .collect();
    let server = ChunkServer::start(&fixtures(visible.iter().copied())).await.unwrap();

    let state = ViewerState {
        viewport: Viewport::new(32, 32, 1.0),
        player_x: 0.0,
        player_z: 0.0,
        mode: VisibilityMode::Viewport,
        visible_range: 0,
    };
    let fetcher = HttpChunkFetcher::new(&server.base_url(), None).unwrap();
    let pipeline = Pipeline::start(fetcher, state, WorkerSettings::default(), 0, 2);

    pipeline.settle(9).await.unwrap();
    assert_eq!(pipeline.store.coords(), visible);
    assert_eq!(pipeline.stats().failed, 0);

    pipeline.stop().await.unwrap();
}

#[tokio::test]
async fn origin_policy_decides_mismatched_chunks() {
    let coord = ChunkCoordinate::new(0, 0);
    // Chunk (0,0) claims to sit at chunk (5,5).
    let bytes = encode_chunk(ChunkCoordinate::new(5, 5), RecordProfile::Wide);
    let server = ChunkServer::start(&[(coord, bytes)]).await.unwrap();

    for (origin_check, resident) in [(OriginCheck::Lenient, 1), (OriginCheck::Strict, 0)] {
        let fetcher = HttpChunkFetcher::new(&server.base_url(), None).unwrap();
        let settings = WorkerSettings {
            profile: RecordProfile::Wide,
            origin_check,
        };
        let pipeline = Pipeline::start(fetcher, player_state(0), settings, 1, 1);

        pipeline.settle(1).await.unwrap();
        assert_eq!(pipeline.stats().resident, resident, "{:?}", origin_check);
        if resident == 1 {
            let chunk = pipeline.store.get(coord).unwrap();
            assert_eq!(chunk.origin, WorldOrigin { world_x: 80, world_z: 80 });
        }
        pipeline.stop().await.unwrap();
    }
}

#[tokio::test]
async fn wrong_profile_is_a_decode_failure() {
    let coord = ChunkCoordinate::new(0, 0);
    // 8 + 3 bytes: not a whole number of 5-byte wide records.
    let mut bytes = vec![0u8; 8];
    bytes.extend_from_slice(&[1, 2, 3]);
    let server = ChunkServer::start(&[(coord, bytes)]).await.unwrap();

    let fetcher = HttpChunkFetcher::new(&server.base_url(), None).unwrap();
    let pipeline = Pipeline::start(fetcher, player_state(0), WorkerSettings::default(), 1, 1);

    pipeline.settle(1).await.unwrap();
    assert_eq!(pipeline.stats().failed, 1);
    assert!(pipeline.store.is_empty());
    pipeline.stop().await.unwrap();
}

#[tokio::test]
async fn moving_the_player_streams_new_chunks() {
    let codec = ChunkCodec::new(CHUNK_SIZE, RecordProfile::Narrow);
    let settings = WorkerSettings {
        profile: RecordProfile::Narrow,
        origin_check: OriginCheck::Strict,
    };
    let pipeline = Pipeline::start(SyntheticFetcher::new(codec), player_state(0), settings, 1, 1);

    pipeline.settle(1).await.unwrap();
    assert_eq!(pipeline.store.coords(), vec![ChunkCoordinate::new(0, 0)]);

    pipeline
        .camera
        .send(CameraCommand::MovePlayer { x: -20.0, z: 40.0 })
        .await
        .unwrap();
    pipeline.settle(2).await.unwrap();
    assert_eq!(
        pipeline.store.coords(),
        vec![ChunkCoordinate::new(-2, 2), ChunkCoordinate::new(0, 0)]
    );

    let status = pipeline.status.borrow().clone();
    assert_eq!((status.player_x, status.player_z), (-20.0, 40.0));
    pipeline.stop().await.unwrap();
}
