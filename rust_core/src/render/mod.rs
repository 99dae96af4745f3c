//! Chart rendering for the live score feed.
//!
//! Renderers consume a [`ChartSnapshot`] and never touch `GameStats`
//! directly. Available implementations:
//! - [`TerminalRenderer`]: two side-by-side ratatui charts (scores, momentum)
//! - [`HeadlessRenderer`]: one log line per frame
//! - [`Throttled`]: wraps another renderer and coalesces frames that arrive
//!   faster than a minimum interval

pub mod headless;
pub mod snapshot;
pub mod terminal;
pub mod throttle;

pub use headless::HeadlessRenderer;
pub use snapshot::{ChartSnapshot, TeamSeries, TopScorer};
pub use terminal::TerminalRenderer;
pub use throttle::Throttled;

use crate::error::RenderError;

/// A consumer of chart snapshots
pub trait Renderer {
    /// Redraw both plots from `snapshot`.
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<(), RenderError>;

    /// Called once after the last event. Flushes anything still pending.
    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Short name for logging
    fn name(&self) -> &str;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<(), RenderError> {
        (**self).render(snapshot)
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        (**self).finish()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
