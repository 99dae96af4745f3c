// Shared models for the Courtside game feed
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RecordValidationError;

/// Timestamp layout used by the event file (`YYYY-MM-DD HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Game Event (one record from the feed)
// ============================================================================

/// One scoring/play record from the simulated game feed.
///
/// `points_scored` is kept as the raw JSON value so a malformed value only
/// rejects that one event at aggregation time instead of the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub game: String,
    pub team: String,
    pub player: String,
    #[serde(alias = "points")]
    pub points_scored: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GameEvent {
    pub fn new(
        timestamp: NaiveDateTime,
        game: impl Into<String>,
        team: impl Into<String>,
        player: impl Into<String>,
        points_scored: i64,
    ) -> Self {
        Self {
            timestamp,
            game: game.into(),
            team: team.into(),
            player: player.into(),
            points_scored: serde_json::Value::from(points_scored),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Copy of this event carrying a new timestamp
    pub fn restamped(&self, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }

    /// Parse one raw record from the feed. When a record carries both
    /// `points_scored` and the legacy `points`, `points_scored` wins.
    pub fn from_record(mut record: serde_json::Value) -> Result<Self, serde_json::Error> {
        if let Some(fields) = record.as_object_mut() {
            if fields.contains_key("points_scored") {
                fields.remove("points");
            }
        }
        serde_json::from_value(record)
    }

    /// Validated points for this play.
    pub fn points(&self) -> Result<u32, RecordValidationError> {
        match &self.points_scored {
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    u32::try_from(v).map_err(|_| RecordValidationError::PointsOutOfRange(v))
                } else if let Some(v) = n.as_i64() {
                    Err(RecordValidationError::NegativePoints(v))
                } else {
                    Err(RecordValidationError::NonIntegerPoints(n.to_string()))
                }
            }
            other => Err(RecordValidationError::NonIntegerPoints(other.to_string())),
        }
    }
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Aggregate State
// ============================================================================

/// Running totals for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamState {
    pub name: String,
    pub score: u64,
    /// (event index, cumulative score) after each scoring play
    pub samples: Vec<(usize, u64)>,
}

impl TeamState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            samples: Vec::new(),
        }
    }
}

/// Running totals for one player on one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerState {
    pub name: String,
    pub team: String,
    pub points: u64,
}

impl PlayerState {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            points: 0,
        }
    }
}

/// Score differential (team A minus team B) after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MomentumSample {
    pub index: usize,
    pub value: i64,
}

/// A play-by-play line kept for the ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayNote {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub team: String,
    pub player: String,
    pub points: u32,
    pub message: String,
}
