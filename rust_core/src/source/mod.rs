//! Event source: loads the recorded game feed and replays it as a live stream.
//!
//! The file is read and validated once. Streaming walks the in-memory
//! sequence in file order, waiting `delay` between emissions. Calling
//! [`stream`] again replays from the first event.

use crate::error::LoadError;
use crate::models::GameEvent;
use futures_util::stream::{self, Stream};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Owns the loaded event sequence.
#[derive(Debug, Clone, Default)]
pub struct EventSource {
    events: Vec<GameEvent>,
}

impl EventSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(Self {
            events: open(path)?,
        })
    }

    pub fn from_events(events: Vec<GameEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Lazily emit every event, one per `delay`.
    pub fn stream(&self, delay: Duration) -> impl Stream<Item = GameEvent> + '_ {
        stream(&self.events, delay)
    }
}

/// Load and validate the event file at `path`.
pub fn open(path: impl AsRef<Path>) -> Result<Vec<GameEvent>, LoadError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let records: Vec<serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let events = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            GameEvent::from_record(record).map_err(|e| LoadError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Replay `events` in order. The first event is yielded immediately and
/// every later one after `delay`.
pub fn stream(events: &[GameEvent], delay: Duration) -> impl Stream<Item = GameEvent> + '_ {
    stream::unfold(0usize, move |next| async move {
        let event = events.get(next)?;
        if next > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!("Emitting event {}/{}", next + 1, events.len());
        Some((event.clone(), next + 1))
    })
}
