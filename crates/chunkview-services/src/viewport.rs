//! Viewport → chunk range mapping.
//!
//! The viewport maps world space to screen space as
//! `screen = (world - offset) * scale`, with `offset` in world blocks and
//! `scale` in screen pixels per block. The visible range is the chunk
//! rectangle covering the inverse-mapped canvas corners, floored on the low
//! edge and ceiled on the high edge, so it may over-cover by one chunk.
//! Each axis is capped at [`MAX_VISIBLE_SPAN`] chunks around the viewport
//! centre.

use serde::{Deserialize, Serialize};

use chunkview_core::ChunkCoordinate;

/// Multiplier applied per zoom step.
pub const ZOOM_STEP: f64 = 1.1;

pub const MIN_SCALE: f64 = 0.125;
pub const MAX_SCALE: f64 = 256.0;

/// Widest run of chunks `visible_chunk_range` hands out along one axis.
pub const MAX_VISIBLE_SPAN: u32 = 256;

/// Largest range `visible_chunk_range` will hand out.
pub const MAX_VISIBLE_CHUNKS: u64 = (MAX_VISIBLE_SPAN as u64) * (MAX_VISIBLE_SPAN as u64);

/// Pan/zoom state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Viewport {
    pub fn new(canvas_width: u32, canvas_height: u32, scale: f64) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale,
            canvas_width,
            canvas_height,
        }
    }

    /// Drag by a screen-space delta. Dragging right reveals what is left.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x -= dx / self.scale;
        self.offset_y -= dy / self.scale;
    }

    /// Zoom in (`steps > 0`) or out (`steps < 0`), clamped to
    /// [`MIN_SCALE`]..=[`MAX_SCALE`].
    pub fn zoom(&mut self, steps: i32) {
        self.scale = (self.scale * ZOOM_STEP.powi(steps)).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn resize(&mut self, canvas_width: u32, canvas_height: u32) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
    }

    pub fn screen_to_world(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (
            self.offset_x + screen_x / self.scale,
            self.offset_y + screen_y / self.scale,
        )
    }
}

/// Inclusive rectangle of chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    pub min_chunk_x: i32,
    pub max_chunk_x: i32,
    pub min_chunk_z: i32,
    pub max_chunk_z: i32,
}

impl ChunkRange {
    pub fn contains(&self, coord: ChunkCoordinate) -> bool {
        (self.min_chunk_x..=self.max_chunk_x).contains(&coord.x)
            && (self.min_chunk_z..=self.max_chunk_z).contains(&coord.z)
    }

    pub fn width(&self) -> u64 {
        span(self.min_chunk_x, self.max_chunk_x)
    }

    pub fn depth(&self) -> u64 {
        span(self.min_chunk_z, self.max_chunk_z)
    }

    /// Number of chunks covered. Saturates at `u64::MAX` for the full i32 plane.
    pub fn len(&self) -> u64 {
        self.width().saturating_mul(self.depth())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column by column: X outer, Z inner.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoordinate> {
        let (min_z, max_z) = (self.min_chunk_z, self.max_chunk_z);
        (self.min_chunk_x..=self.max_chunk_x)
            .flat_map(move |x| (min_z..=max_z).map(move |z| ChunkCoordinate::new(x, z)))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("canvas has zero area")]
    EmptyCanvas,
}

/// Computes which chunk coordinates should be resident.
#[derive(Debug, Clone, Copy)]
pub struct ViewportTracker {
    chunk_size: u32,
}

impl ViewportTracker {
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn visible_chunk_range(&self, viewport: &Viewport) -> Result<ChunkRange, ViewportError> {
        if !(viewport.scale.is_finite() && viewport.scale > 0.0) {
            return Err(ViewportError::InvalidScale(viewport.scale));
        }
        if viewport.canvas_width == 0 || viewport.canvas_height == 0 {
            return Err(ViewportError::EmptyCanvas);
        }

        let w = f64::from(viewport.canvas_width);
        let h = f64::from(viewport.canvas_height);
        let corners = [
            viewport.screen_to_world(0.0, 0.0),
            viewport.screen_to_world(w, 0.0),
            viewport.screen_to_world(0.0, h),
            viewport.screen_to_world(w, h),
        ];

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_z, mut max_z) = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, z) in corners {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_z = min_z.min(z);
            max_z = max_z.max(z);
        }

        let size = f64::from(self.chunk_size);
        // Float → int casts saturate, so far-off offsets clamp to the i32 edges.
        let range = ChunkRange {
            min_chunk_x: (min_x / size).floor() as i32,
            max_chunk_x: (max_x / size).ceil() as i32,
            min_chunk_z: (min_z / size).floor() as i32,
            max_chunk_z: (max_z / size).ceil() as i32,
        };
        let (min_chunk_x, max_chunk_x) =
            cap_span(range.min_chunk_x, range.max_chunk_x, (min_x + max_x) / 2.0 / size);
        let (min_chunk_z, max_chunk_z) =
            cap_span(range.min_chunk_z, range.max_chunk_z, (min_z + max_z) / 2.0 / size);
        if (min_chunk_x, max_chunk_x, min_chunk_z, max_chunk_z)
            != (range.min_chunk_x, range.max_chunk_x, range.min_chunk_z, range.max_chunk_z)
        {
            tracing::debug!(
                chunks = range.len(),
                max = MAX_VISIBLE_CHUNKS,
                "visible range capped around viewport centre"
            );
        }

        Ok(ChunkRange {
            min_chunk_x,
            max_chunk_x,
            min_chunk_z,
            max_chunk_z,
        })
    }

    /// Square of `radius` chunks around the chunk holding the player.
    pub fn around_player(&self, player_x: f64, player_z: f64, radius: u32) -> ChunkRange {
        let center = ChunkCoordinate::containing(player_x, player_z, self.chunk_size);
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        ChunkRange {
            min_chunk_x: center.x.saturating_sub(r),
            max_chunk_x: center.x.saturating_add(r),
            min_chunk_z: center.z.saturating_sub(r),
            max_chunk_z: center.z.saturating_add(r),
        }
    }
}

fn span(min: i32, max: i32) -> u64 {
    (i64::from(max) - i64::from(min) + 1).max(0) as u64
}

/// Shrink `min..=max` to at most [`MAX_VISIBLE_SPAN`] chunks centred on
/// `center` (in chunk units), staying inside the i32 grid.
fn cap_span(min: i32, max: i32, center: f64) -> (i32, i32) {
    let limit = i64::from(MAX_VISIBLE_SPAN);
    if span(min, max) <= limit as u64 {
        return (min, max);
    }
    let lo = (center.floor() as i64 - limit / 2)
        .clamp(i64::from(min), i64::from(max) - limit + 1);
    (lo as i32, (lo + limit - 1) as i32)
}
