//! Courtside Core - replay a recorded game feed and chart it live.
//!
//! This crate provides:
//! - Event loading and validation from a JSON event file (`source`)
//! - Delayed, in-order replay of the loaded events as a lazy stream
//! - Running team/player totals and score momentum (`stats`)
//! - Read-only chart snapshots and renderers (`render`)

pub mod error;
pub mod models;
pub mod render;
pub mod source;
pub mod stats;

pub use error::{LoadError, RecordValidationError, RenderError};
pub use models::{GameEvent, MomentumSample, PlayNote, PlayerState, TeamState};
pub use render::{ChartSnapshot, Renderer};
pub use source::EventSource;
pub use stats::GameStats;
