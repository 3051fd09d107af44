//! Coordinator: owns the viewer state and the load queue.
//!
//! One task runs the coordinator. On every tick it recomputes the visible
//! chunk set, queues anything new, and dispatches up to the concurrency cap
//! to the decode workers. Worker responses and camera commands arrive on
//! channels and are applied on the same task, so the queue is never touched
//! concurrently.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;

use chunkview_core::config::{ViewportConfig, VisibilityMode};
use chunkview_core::{DecodeRequest, DecodeResponse};

use crate::load_queue::{LoadOutcome, LoadQueue, QueueStats};
use crate::render::RenderAdapter;
use crate::viewport::{
    ChunkRange, Viewport, ViewportError, ViewportTracker, MAX_SCALE, MAX_VISIBLE_SPAN, MIN_SCALE,
};

/// Camera and player state. Mutated only by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub viewport: Viewport,
    pub player_x: f64,
    pub player_z: f64,
    pub mode: VisibilityMode,
    pub visible_range: u32,
}

impl ViewerState {
    /// Scale and player radius are clamped to what zooming and the range cap allow.
    pub fn from_config(config: &ViewportConfig) -> Self {
        let scale = config.scale.clamp(MIN_SCALE, MAX_SCALE);
        let visible_range = config.visible_range.min((MAX_VISIBLE_SPAN - 1) / 2);
        if scale != config.scale || visible_range != config.visible_range {
            tracing::warn!(
                scale = config.scale,
                visible_range = config.visible_range,
                "viewport config out of range, clamped"
            );
        }
        Self {
            viewport: Viewport::new(config.canvas_width, config.canvas_height, scale),
            player_x: 0.0,
            player_z: 0.0,
            mode: config.mode,
            visible_range,
        }
    }
}

/// Input from the outside world (API, UI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraCommand {
    Pan { dx: f64, dy: f64 },
    Zoom { steps: i32 },
    MovePlayer { x: f64, z: f64 },
    Resize { width: u32, height: u32 },
    SetMode { mode: VisibilityMode },
}

/// Snapshot published after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerStatus {
    pub viewport: Viewport,
    pub player_x: f64,
    pub player_z: f64,
    pub mode: VisibilityMode,
    pub chunk_size: u32,
    /// Last computed visible range. None if the viewport was unusable.
    pub visible: Option<ChunkRange>,
    pub queue: QueueStats,
    pub ticks: u64,
}

pub struct Coordinator<R: RenderAdapter> {
    state: ViewerState,
    queue: LoadQueue,
    tracker: ViewportTracker,
    requests: mpsc::Sender<DecodeRequest>,
    responses: mpsc::Receiver<DecodeResponse>,
    camera: mpsc::Receiver<CameraCommand>,
    renderer: R,
    status: watch::Sender<ViewerStatus>,
    shutdown: broadcast::Receiver<()>,
    tick_interval: Duration,
    visible: Option<ChunkRange>,
    ticks: u64,
}

impl<R: RenderAdapter> Coordinator<R> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: ViewerState,
        chunk_size: u32,
        max_concurrent_loads: usize,
        requests: mpsc::Sender<DecodeRequest>,
        responses: mpsc::Receiver<DecodeResponse>,
        camera: mpsc::Receiver<CameraCommand>,
        renderer: R,
        shutdown: broadcast::Receiver<()>,
        tick_interval: Duration,
    ) -> Self {
        let tracker = ViewportTracker::new(chunk_size);
        let queue = LoadQueue::new(max_concurrent_loads);
        let (status, _) = watch::channel(ViewerStatus {
            viewport: state.viewport,
            player_x: state.player_x,
            player_z: state.player_z,
            mode: state.mode,
            chunk_size: tracker.chunk_size(),
            visible: None,
            queue: queue.stats(),
            ticks: 0,
        });

        Self {
            state,
            queue,
            tracker,
            requests,
            responses,
            camera,
            renderer,
            status,
            shutdown,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            visible: None,
            ticks: 0,
        }
    }

    /// Receiver that always holds the latest [`ViewerStatus`].
    pub fn status(&self) -> watch::Receiver<ViewerStatus> {
        self.status.subscribe()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn queue(&self) -> &LoadQueue {
        &self.queue
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn visible_range(&self) -> Result<ChunkRange, ViewportError> {
        match self.state.mode {
            VisibilityMode::Viewport => self.tracker.visible_chunk_range(&self.state.viewport),
            VisibilityMode::Player => Ok(self.tracker.around_player(
                self.state.player_x,
                self.state.player_z,
                self.state.visible_range,
            )),
        }
    }

    /// One scheduling pass. Returns how many requests were dispatched.
    pub fn tick(&mut self) -> usize {
        self.ticks += 1;

        self.visible = match self.visible_range() {
            Ok(range) => Some(range),
            Err(e) => {
                tracing::warn!(error = %e, "visible range unavailable, dispatching queued chunks only");
                None
            }
        };

        let admitted = match self.visible {
            Some(range) => self.queue.tick(range.iter()),
            None => self.queue.admit(),
        };

        let scale = self.state.viewport.scale;
        let chunk_size = self.tracker.chunk_size();
        let mut dispatched = 0;
        for coord in admitted {
            match self.requests.try_send(DecodeRequest::new(coord, scale, chunk_size)) {
                Ok(()) => dispatched += 1,
                Err(e) => {
                    tracing::warn!(
                        chunk_x = coord.x,
                        chunk_z = coord.z,
                        error = %e,
                        "could not hand chunk to decode workers"
                    );
                    self.queue.complete(coord, LoadOutcome::Failed);
                }
            }
        }

        if dispatched > 0 {
            tracing::debug!(
                dispatched,
                in_flight = self.queue.in_flight(),
                pending = self.queue.pending_len(),
                "dispatched chunk loads"
            );
        }
        self.publish_status();
        dispatched
    }

    /// Apply one worker response.
    pub fn handle_response(&mut self, response: DecodeResponse) {
        match response {
            DecodeResponse::Loaded(loaded) => {
                let coord = loaded.coord();
                if self.queue.complete(coord, LoadOutcome::Resident) {
                    let (_, chunk) = loaded.into_decoded();
                    self.renderer.accept(coord, chunk);
                }
            }
            DecodeResponse::Failed(failed) => {
                let coord = failed.coord();
                if self.queue.complete(coord, LoadOutcome::Failed) {
                    tracing::warn!(
                        chunk_x = coord.x,
                        chunk_z = coord.z,
                        error = %failed.error,
                        "chunk marked failed"
                    );
                }
            }
        }
        self.publish_status();
    }

    pub fn apply_camera(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::Pan { dx, dy } => self.state.viewport.pan(dx, dy),
            CameraCommand::Zoom { steps } => self.state.viewport.zoom(steps),
            CameraCommand::MovePlayer { x, z } => {
                self.state.player_x = x;
                self.state.player_z = z;
            }
            CameraCommand::Resize { width, height } => self.state.viewport.resize(width, height),
            CameraCommand::SetMode { mode } => self.state.mode = mode,
        }
        tracing::debug!(?command, "camera updated");
        self.publish_status();
    }

    fn publish_status(&self) {
        self.status.send_replace(ViewerStatus {
            viewport: self.state.viewport,
            player_x: self.state.player_x,
            player_z: self.state.player_z,
            mode: self.state.mode,
            chunk_size: self.tracker.chunk_size(),
            visible: self.visible,
            queue: self.queue.stats(),
            ticks: self.ticks,
        });
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            chunk_size = self.tracker.chunk_size(),
            max_concurrent_loads = self.queue.max_concurrent_loads(),
            tick_ms = self.tick_interval.as_millis() as u64,
            mode = ?self.state.mode,
            "coordinator started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("coordinator shutting down");
                    return Ok(());
                }

                _ = interval.tick() => {
                    self.tick();
                }

                response = self.responses.recv() => match response {
                    Some(response) => self.handle_response(response),
                    None => anyhow::bail!("decode workers stopped"),
                },

                Some(command) = self.camera.recv() => {
                    self.apply_camera(command);
                }
            }
        }
    }
}
