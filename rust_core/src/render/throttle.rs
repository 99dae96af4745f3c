//! Frame coalescing.
//!
//! When events arrive faster than `min_interval`, intermediate frames are
//! dropped and only the newest snapshot is kept. It is drawn by the next
//! frame that is allowed through, or by `finish()`.

use super::{ChartSnapshot, Renderer};
use crate::error::RenderError;
use std::time::{Duration, Instant};
use tracing::trace;

pub struct Throttled<R> {
    inner: R,
    min_interval: Duration,
    last_draw: Option<Instant>,
    pending: Option<ChartSnapshot>,
    drawn: usize,
    coalesced: usize,
}

impl<R: Renderer> Throttled<R> {
    pub fn new(inner: R, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_draw: None,
            pending: None,
            drawn: 0,
            coalesced: 0,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Frames actually handed to the inner renderer
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Frames replaced by a newer snapshot before they were drawn
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    fn due(&self) -> bool {
        match self.last_draw {
            Some(at) => at.elapsed() >= self.min_interval,
            None => true,
        }
    }

    fn draw(&mut self, snapshot: &ChartSnapshot) -> Result<(), RenderError> {
        self.last_draw = Some(Instant::now());
        self.pending = None;
        self.inner.render(snapshot)?;
        self.drawn += 1;
        Ok(())
    }
}

impl<R: Renderer> Renderer for Throttled<R> {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<(), RenderError> {
        if self.min_interval.is_zero() || self.due() {
            return self.draw(snapshot);
        }

        if self.pending.replace(snapshot.clone()).is_some() {
            self.coalesced += 1;
        }
        trace!("Frame deferred (latest index {:?})", snapshot.latest_index);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        if let Some(snapshot) = self.pending.take() {
            self.draw(&snapshot)?;
        }
        self.inner.finish()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
