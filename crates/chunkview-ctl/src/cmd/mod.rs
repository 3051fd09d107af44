//! CLI command modules.

pub mod camera;
pub mod chunks;
pub mod http;
pub mod status;
