//! Stream driver: source -> aggregator -> renderer.
//!
//! Everything runs in one flow of control. The only await point that
//! suspends is the delay between emitted events, so each event is applied and
//! drawn before the next delay starts.

use crate::config::StreamConfig;
use chrono::{Local, NaiveDateTime, Timelike};
use courtside_core::render::Renderer;
use courtside_core::source::{self, EventSource};
use courtside_core::stats::GameStats;
use courtside_core::{GameEvent, LoadError};
use futures_util::StreamExt;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    NotStarted,
    Streaming,
    Finished,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub emitted: usize,
    pub applied: usize,
    pub rejected: usize,
    pub frames_rendered: usize,
    pub frames_failed: usize,
}

#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub emit_interval: Duration,
    pub chart_title: String,
    pub restamp_events: bool,
    pub echo_events: bool,
}

impl From<&StreamConfig> for StreamOptions {
    fn from(config: &StreamConfig) -> Self {
        Self {
            emit_interval: config.emit_interval,
            chart_title: config.chart_title.clone(),
            restamp_events: config.restamp_events,
            echo_events: config.echo_events,
        }
    }
}

pub struct GameStream {
    source: EventSource,
    stats: GameStats,
    options: StreamOptions,
    phase: StreamPhase,
    summary: StreamSummary,
}

impl GameStream {
    pub fn new(source: EventSource, options: StreamOptions) -> Self {
        Self {
            source,
            stats: GameStats::new(),
            options,
            phase: StreamPhase::NotStarted,
            summary: StreamSummary::default(),
        }
    }

    /// Load the configured event file. Fails before anything is streamed.
    pub fn open(config: &StreamConfig) -> Result<Self, LoadError> {
        let source = EventSource::open(&config.source_path)?;
        Ok(Self::new(source, StreamOptions::from(config)))
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn summary(&self) -> &StreamSummary {
        &self.summary
    }

    /// Replay the whole feed once, redrawing after the initial empty state
    /// and after every applied event. A finished stream is not restarted.
    pub async fn run<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> StreamSummary {
        if self.phase != StreamPhase::NotStarted {
            warn!("Stream already {:?}; not restarting", self.phase);
            return self.summary.clone();
        }

        self.phase = StreamPhase::Streaming;
        info!(
            "Streaming {} events every {:.2}s to {} renderer",
            self.source.len(),
            self.options.emit_interval.as_secs_f64(),
            renderer.name()
        );

        redraw(&self.stats, &self.options.chart_title, &mut *renderer, &mut self.summary);

        let mut events = Box::pin(source::stream(
            self.source.events(),
            self.options.emit_interval,
        ));

        while let Some(event) = events.next().await {
            self.summary.emitted += 1;
            let event = if self.options.restamp_events {
                event.restamped(wall_clock())
            } else {
                event
            };

            if self.options.echo_events {
                echo(&event);
            }

            match self.stats.apply(&event) {
                Ok(applied) => {
                    self.summary.applied += 1;
                    debug!(
                        "Event {} applied: {} +{} (momentum {:+})",
                        applied.index, event.team, applied.points, applied.momentum
                    );
                    redraw(&self.stats, &self.options.chart_title, &mut *renderer, &mut self.summary);
                }
                Err(e) => {
                    self.summary.rejected += 1;
                    warn!(
                        "Skipping event #{} ({} / {}): {}",
                        self.summary.emitted, event.team, event.player, e
                    );
                }
            }
        }

        if let Err(e) = renderer.finish() {
            self.summary.frames_failed += 1;
            warn!("Final frame failed: {}", e);
        }

        self.phase = StreamPhase::Finished;
        info!(
            "Stream finished: {} emitted, {} applied, {} rejected, {} frames ({} failed)",
            self.summary.emitted,
            self.summary.applied,
            self.summary.rejected,
            self.summary.frames_rendered,
            self.summary.frames_failed
        );
        self.summary.clone()
    }
}

fn redraw<R: Renderer + ?Sized>(
    stats: &GameStats,
    title: &str,
    renderer: &mut R,
    summary: &mut StreamSummary,
) {
    match renderer.render(&stats.snapshot(title)) {
        Ok(()) => summary.frames_rendered += 1,
        Err(e) => {
            summary.frames_failed += 1;
            warn!("Skipping frame: {}", e);
        }
    }
}

fn echo(event: &GameEvent) {
    match serde_json::to_string(event) {
        Ok(line) => info!("Sent event: {}", line),
        Err(e) => warn!("Could not serialize event for echo: {}", e),
    }
}

/// Local wall clock at second precision, matching the event file format
fn wall_clock() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
