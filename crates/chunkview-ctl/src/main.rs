//! chunkview-ctl: command-line interface for the chunkview daemon.

mod cmd;

use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 9101;

fn parse<T: FromStr>(value: &str, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("{} must be a number, got {:?}", what, value))
}

fn print_usage() {
    println!("Usage: chunkview-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status              Show viewport, player and load queue state");
    println!("  chunks              List resident chunks");
    println!("  chunk <x> <z>       Inspect one resident chunk");
    println!("  pan <dx> <dy>       Drag the viewport by a screen-space delta");
    println!("  zoom <steps>        Zoom in (positive) or out (negative)");
    println!("  player <x> <z>      Move the player to a world position");
    println!("  resize <w> <h>      Set the canvas size in pixels");
    println!("  mode <mode>         Switch visibility mode (viewport | player)");
    println!("  shutdown            Stop the daemon");
    println!();
    println!("Options:");
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | [] => cmd::status::cmd_status(port).await,
        ["chunks"] => cmd::chunks::cmd_chunks(port).await,
        ["chunk", x, z] => cmd::chunks::cmd_chunk(port, parse(x, "x")?, parse(z, "z")?).await,
        ["pan", dx, dy] => cmd::camera::cmd_pan(port, parse(dx, "dx")?, parse(dy, "dy")?).await,
        ["zoom", steps] => cmd::camera::cmd_zoom(port, parse(steps, "steps")?).await,
        ["player", x, z] => cmd::camera::cmd_player(port, parse(x, "x")?, parse(z, "z")?).await,
        ["resize", w, h] => {
            cmd::camera::cmd_resize(port, parse(w, "width")?, parse(h, "height")?).await
        }
        ["mode", mode] => cmd::camera::cmd_mode(port, mode).await,
        ["shutdown"] => cmd::status::cmd_shutdown(port).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
