//! Daemon status and shutdown commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json, post_json};

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    viewport: Viewport,
    player_x: f64,
    player_z: f64,
    mode: String,
    chunk_size: u32,
    visible: Option<ChunkRange>,
    queue: QueueStats,
    ticks: u64,
    resident_chunks: usize,
    resident_blocks: usize,
}

#[derive(Deserialize)]
struct Viewport {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    canvas_width: u32,
    canvas_height: u32,
}

#[derive(Deserialize)]
struct ChunkRange {
    min_chunk_x: i32,
    max_chunk_x: i32,
    min_chunk_z: i32,
    max_chunk_z: i32,
}

#[derive(Deserialize)]
struct QueueStats {
    queued: usize,
    loading: usize,
    resident: usize,
    failed: usize,
    max_concurrent_loads: usize,
}

#[derive(Deserialize)]
struct ShutdownResponse {
    message: String,
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Chunkview Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Mode             : {}", resp.mode);
    println!("  Chunk size       : {}", resp.chunk_size);
    println!(
        "  Viewport         : offset ({:.1}, {:.1})  scale {:.3}  canvas {}x{}",
        resp.viewport.offset_x,
        resp.viewport.offset_y,
        resp.viewport.scale,
        resp.viewport.canvas_width,
        resp.viewport.canvas_height
    );
    println!("  Player           : ({:.1}, {:.1})", resp.player_x, resp.player_z);
    match &resp.visible {
        Some(r) => println!(
            "  Visible chunks   : x {}..={}  z {}..={}",
            r.min_chunk_x, r.max_chunk_x, r.min_chunk_z, r.max_chunk_z
        ),
        None => println!("  Visible chunks   : (viewport unusable)"),
    }
    println!("  Ticks            : {}", resp.ticks);

    println!("\n  Load queue:");
    println!("  ┌─ queued   : {}", resp.queue.queued);
    println!(
        "  │  loading  : {} / {}",
        resp.queue.loading, resp.queue.max_concurrent_loads
    );
    println!("  │  resident : {}", resp.queue.resident);
    println!("  └─ failed   : {}", resp.queue.failed);

    println!(
        "\n  Stored: {} chunks, {} blocks",
        resp.resident_chunks, resp.resident_blocks
    );

    Ok(())
}

pub async fn cmd_shutdown(port: u16) -> Result<()> {
    let resp: ShutdownResponse = post_json(&format!("{}/daemon/shutdown", base_url(port))).await?;
    println!("{}", resp.message);
    Ok(())
}
