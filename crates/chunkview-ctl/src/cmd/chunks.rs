//! Resident chunk listing and inspection.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct ChunkListResponse {
    chunks: Vec<ChunkSummary>,
}

#[derive(Deserialize)]
struct ChunkSummary {
    x: i32,
    z: i32,
    origin_x: i32,
    origin_z: i32,
    blocks: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadedChunk {
    chunk_x: i32,
    chunk_z: i32,
    chunk_start_x: i32,
    chunk_start_z: i32,
    chunk_data: Vec<BlockSample>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockSample {
    height: u8,
    block_type_code: u32,
}

pub async fn cmd_chunks(port: u16) -> Result<()> {
    let resp: ChunkListResponse = get_json(&format!("{}/chunks", base_url(port))).await?;

    if resp.chunks.is_empty() {
        println!("No chunks resident yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Resident Chunks ({})", resp.chunks.len());
    println!("═══════════════════════════════════════");
    for c in &resp.chunks {
        println!(
            "  {:>6},{:<6}  origin ({}, {})  {} blocks",
            c.x, c.z, c.origin_x, c.origin_z, c.blocks
        );
    }

    Ok(())
}

pub async fn cmd_chunk(port: u16, x: i32, z: i32) -> Result<()> {
    let chunk: LoadedChunk = get_json(&format!("{}/chunks/{}/{}", base_url(port), x, z)).await?;

    let mut types: BTreeMap<u32, usize> = BTreeMap::new();
    for block in &chunk.chunk_data {
        *types.entry(block.block_type_code).or_default() += 1;
    }
    let max_height = chunk.chunk_data.iter().map(|b| b.height).max().unwrap_or(0);
    let min_height = chunk.chunk_data.iter().map(|b| b.height).min().unwrap_or(0);

    println!("═══════════════════════════════════════");
    println!("  Chunk {},{}", chunk.chunk_x, chunk.chunk_z);
    println!("═══════════════════════════════════════");
    println!("  Origin  : ({}, {})", chunk.chunk_start_x, chunk.chunk_start_z);
    println!("  Blocks  : {}", chunk.chunk_data.len());
    println!("  Height  : {}..={}", min_height, max_height);
    println!("\n  Block types:");
    for (code, count) in &types {
        println!("    {:>4} : {}", code, count);
    }

    Ok(())
}
