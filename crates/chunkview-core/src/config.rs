//! Configuration system for chunkview.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $CHUNKVIEW_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/chunkview/config.toml
//!   3. ~/.config/chunkview/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::wire::{ChunkCodec, OriginCheck, RecordProfile, DEFAULT_CHUNK_SIZE};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub source: SourceConfig,
    pub chunks: ChunkConfig,
    pub queue: QueueConfig,
    pub viewport: ViewportConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL that `chunks/chunk.<x>.<z>.dat` is resolved against.
    pub base_url: String,
    /// Per-request timeout in milliseconds. 0 = no timeout.
    pub request_timeout_ms: u64,
    /// Serve generated chunks in-process instead of fetching over HTTP.
    pub synthetic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Chunk edge length in blocks.
    pub chunk_size: u32,
    pub record_profile: RecordProfile,
    pub origin_check: OriginCheck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub max_concurrent_loads: usize,
    pub tick_interval_ms: u64,
    /// Decode workers. 0 = direct mode, one short-lived task per chunk.
    pub worker_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Chunks under the panned/zoomed canvas.
    Viewport,
    /// A square of chunks around the player position.
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub mode: VisibilityMode,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Initial screen pixels per block.
    pub scale: f64,
    /// Radius in chunks for player mode.
    pub visible_range: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
    /// Directory served under `/chunks/`. Unset = no static serving.
    pub serve_dir: Option<PathBuf>,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9101/".to_string(),
            request_timeout_ms: 10_000,
            synthetic: false,
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            record_profile: RecordProfile::Wide,
            origin_check: OriginCheck::Lenient,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: 3,
            tick_interval_ms: 200,
            worker_count: 1,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mode: VisibilityMode::Viewport,
            canvas_width: 800,
            canvas_height: 600,
            scale: 1.0,
            visible_range: 5,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 9101,
            serve_dir: None,
        }
    }
}

impl ChunkConfig {
    pub fn codec(&self) -> ChunkCodec {
        ChunkCodec::new(self.chunk_size, self.record_profile)
    }
}

impl QueueConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("chunkview")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl ViewerConfig {
    /// Load config: env vars → file → defaults. The result is validated.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            Self::from_toml(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            ViewerConfig::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("CHUNKVIEW_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&ViewerConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(key: &'static str, reason: &str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                key,
                reason: reason.to_string(),
            })
        }

        if self.chunks.chunk_size == 0 {
            return invalid("chunks.chunk_size", "must be at least 1");
        }
        if self.queue.max_concurrent_loads == 0 {
            return invalid("queue.max_concurrent_loads", "must be at least 1");
        }
        if self.queue.tick_interval_ms == 0 {
            return invalid("queue.tick_interval_ms", "must be at least 1");
        }
        if !(self.viewport.scale.is_finite() && self.viewport.scale > 0.0) {
            return invalid("viewport.scale", "must be a positive number");
        }
        if self.viewport.canvas_width == 0 || self.viewport.canvas_height == 0 {
            return invalid("viewport.canvas_width/canvas_height", "must be non-zero");
        }
        if !self.source.synthetic && self.source.base_url.is_empty() {
            return invalid("source.base_url", "required unless source.synthetic is set");
        }
        Ok(())
    }

    /// Apply CHUNKVIEW_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn flag(v: &str) -> bool {
            v == "true" || v == "1"
        }

        if let Some(v) = lookup("CHUNKVIEW_SOURCE__BASE_URL") {
            self.source.base_url = v;
        }
        if let Some(v) = lookup("CHUNKVIEW_SOURCE__SYNTHETIC") {
            self.source.synthetic = flag(&v);
        }
        if let Some(p) = lookup("CHUNKVIEW_CHUNKS__CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            self.chunks.chunk_size = p;
        }
        if let Some(v) = lookup("CHUNKVIEW_CHUNKS__RECORD_PROFILE") {
            match v.as_str() {
                "wide" => self.chunks.record_profile = RecordProfile::Wide,
                "narrow" => self.chunks.record_profile = RecordProfile::Narrow,
                _ => {}
            }
        }
        if let Some(v) = lookup("CHUNKVIEW_CHUNKS__ORIGIN_CHECK") {
            match v.as_str() {
                "lenient" => self.chunks.origin_check = OriginCheck::Lenient,
                "strict" => self.chunks.origin_check = OriginCheck::Strict,
                _ => {}
            }
        }
        if let Some(p) = lookup("CHUNKVIEW_QUEUE__MAX_CONCURRENT_LOADS").and_then(|v| v.parse().ok()) {
            self.queue.max_concurrent_loads = p;
        }
        if let Some(p) = lookup("CHUNKVIEW_QUEUE__TICK_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.queue.tick_interval_ms = p;
        }
        if let Some(p) = lookup("CHUNKVIEW_QUEUE__WORKER_COUNT").and_then(|v| v.parse().ok()) {
            self.queue.worker_count = p;
        }
        if let Some(p) = lookup("CHUNKVIEW_API__PORT").and_then(|v| v.parse().ok()) {
            self.api.port = p;
        }
        if let Some(v) = lookup("CHUNKVIEW_API__SERVE_DIR") {
            self.api.serve_dir = (!v.is_empty()).then(|| PathBuf::from(v));
        }
    }
}
