//! game_stream_rust - replay a recorded game feed and chart scores and momentum live

pub mod config;
pub mod logging;
pub mod pipeline;

pub use config::{RenderMode, StreamConfig};
pub use pipeline::{GameStream, StreamOptions, StreamPhase, StreamSummary};
