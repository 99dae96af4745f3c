//! Log-only renderer for runs without a usable terminal.

use super::{ChartSnapshot, Renderer};
use crate::error::RenderError;
use tracing::info;

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

/// One-line scoreboard, e.g. `Aces 4 - Mercury 3 | momentum +1 | top: A'ja Wilson (4)`
pub fn summary_line(snapshot: &ChartSnapshot) -> String {
    if snapshot.is_empty() {
        return "waiting for first event".to_string();
    }

    let scores = snapshot
        .teams
        .iter()
        .map(|t| format!("{} {}", t.name, t.score))
        .collect::<Vec<_>>()
        .join(" - ");

    let mut line = format!("{} | momentum {:+}", scores, snapshot.current_momentum);

    if !snapshot.top_scorers.is_empty() {
        let top = snapshot
            .top_scorers
            .iter()
            .map(|s| format!("{} ({})", s.player, s.points))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(" | top: {}", top));
    }
    line
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<(), RenderError> {
        self.frames += 1;
        info!("[{}] frame {}: {}", snapshot.title, self.frames, summary_line(snapshot));
        Ok(())
    }

    fn name(&self) -> &str {
        "headless"
    }
}
