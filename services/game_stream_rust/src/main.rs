//! GameStream Rust Service
//!
//! Replays a recorded game feed as if it were live:
//! - Loads and validates the event file once
//! - Emits one event per configured interval
//! - Aggregates team/player totals and momentum
//! - Redraws the score and momentum charts after every event

use anyhow::{Context, Result};
use courtside_core::render::{HeadlessRenderer, Renderer, TerminalRenderer, Throttled};
use dotenv::dotenv;
use game_stream_rust::config::{RenderMode, StreamConfig};
use game_stream_rust::logging;
use game_stream_rust::pipeline::GameStream;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = StreamConfig::from_env().context("Invalid configuration")?;

    let chart_on_screen = config.render_mode == RenderMode::Terminal && std::io::stdout().is_terminal();
    let log_file = config.log_file.clone().or_else(|| {
        chart_on_screen.then(|| PathBuf::from(logging::DEFAULT_TERMINAL_LOG_FILE))
    });
    logging::init(log_file.as_deref())?;

    info!("Starting GameStream Rust Service...");
    info!("Streaming events from: {}", config.source_path.display());

    let mut stream = GameStream::open(&config)
        .with_context(|| format!("Failed to load events from {}", config.source_path.display()))?;

    match config.render_mode {
        RenderMode::Terminal => match TerminalRenderer::stdout() {
            Ok(terminal) => {
                let mut renderer = Throttled::new(terminal, config.min_frame_interval);
                run_until_interrupted(&mut stream, &mut renderer, config.hold_on_finish).await;
                // Dropping the renderer hands the screen back.
            }
            Err(e) => {
                warn!("Terminal chart unavailable ({}), falling back to headless output", e);
                let mut renderer = Throttled::new(HeadlessRenderer::new(), config.min_frame_interval);
                run_until_interrupted(&mut stream, &mut renderer, false).await;
            }
        },
        RenderMode::Headless => {
            let mut renderer = Throttled::new(HeadlessRenderer::new(), config.min_frame_interval);
            run_until_interrupted(&mut stream, &mut renderer, false).await;
        }
    }

    info!("GameStream shutting down");
    Ok(())
}

/// Drive the stream to completion. Ctrl-C ends the run early; with `hold`
/// the final chart stays up until Ctrl-C.
async fn run_until_interrupted<R: Renderer>(stream: &mut GameStream, renderer: &mut R, hold: bool) {
    tokio::select! {
        summary = stream.run(renderer) => {
            info!(
                "Feed complete: {} applied, {} rejected",
                summary.applied, summary.rejected
            );
            if hold {
                info!("Holding final chart; press Ctrl-C to exit");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Could not listen for Ctrl-C: {}", e);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; stopping stream");
        }
    }
}
