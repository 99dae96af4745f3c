//! Error kinds for loading, validating and rendering game events.
//!
//! - `LoadError`: fatal, the source file cannot be turned into events
//! - `RecordValidationError`: one event is skipped, streaming continues
//! - `RenderError`: one frame is skipped, aggregation continues

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("event file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read event file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("event file {} is not a JSON array of events: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("event #{index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordValidationError {
    #[error("points_scored must be >= 0, got {0}")]
    NegativePoints(i64),

    #[error("points_scored must be an integer, got {0}")]
    NonIntegerPoints(String),

    #[error("points_scored {0} is out of range")]
    PointsOutOfRange(u64),

    #[error("event has an empty team name")]
    MissingTeam,

    #[error("event has an empty player name")]
    MissingPlayer,

    #[error("{team} score {score} + {points} exceeds the supported range")]
    ScoreOverflow { team: String, score: u64, points: u32 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("display unavailable: {0}")]
    Unavailable(String),
}
