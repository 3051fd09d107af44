//! Camera commands: pan, zoom, player, resize, mode.

use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;

use super::http::{base_url, post_json_body};

#[derive(Serialize)]
struct PanRequest {
    dx: f64,
    dy: f64,
}

#[derive(Serialize)]
struct ZoomRequest {
    steps: i32,
}

#[derive(Serialize)]
struct PlayerRequest {
    x: f64,
    z: f64,
}

#[derive(Serialize)]
struct ResizeRequest {
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct ModeRequest {
    mode: &'static str,
}

/// Visibility modes the daemon accepts.
fn parse_mode(mode: &str) -> Result<&'static str> {
    match mode {
        "viewport" => Ok("viewport"),
        "player" => Ok("player"),
        other => bail!("mode must be \"viewport\" or \"player\", got {:?}", other),
    }
}

async fn send<T: Serialize>(port: u16, path: &str, body: &T) -> Result<()> {
    let resp: Value = post_json_body(&format!("{}/camera/{}", base_url(port), path), body).await?;
    println!("Accepted: {}", resp["accepted"]);
    Ok(())
}

pub async fn cmd_pan(port: u16, dx: f64, dy: f64) -> Result<()> {
    send(port, "pan", &PanRequest { dx, dy }).await
}

pub async fn cmd_zoom(port: u16, steps: i32) -> Result<()> {
    send(port, "zoom", &ZoomRequest { steps }).await
}

pub async fn cmd_player(port: u16, x: f64, z: f64) -> Result<()> {
    send(port, "player", &PlayerRequest { x, z }).await
}

pub async fn cmd_resize(port: u16, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("canvas size must be non-zero, got {}x{}", width, height);
    }
    send(port, "resize", &ResizeRequest { width, height }).await
}

pub async fn cmd_mode(port: u16, mode: &str) -> Result<()> {
    let mode = parse_mode(mode)?;
    send(port, "mode", &ModeRequest { mode }).await
}
