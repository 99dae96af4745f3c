//! Configuration for game_stream_rust
//!
//! Every option has a built-in default. Newer variable names take precedence
//! over the legacy ones (`BASE_DATA_DIR`/`LIVE_DATA_FILE_NAME`,
//! `MESSAGE_INTERVAL_SECONDS`, `VISUALIZATION_TITLE`).

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding the event file
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default event file name inside the data directory
pub const DEFAULT_LIVE_DATA_FILE: &str = "wnba_playoffs_live.json";

/// Default delay between emitted events, in seconds
pub const DEFAULT_EMIT_INTERVAL_SECS: f64 = 3.0;

/// Default chart title
pub const DEFAULT_CHART_TITLE: &str = "WNBA Playoffs: Live Game Score & Momentum";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Terminal,
    Headless,
}

impl std::str::FromStr for RenderMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "terminal" | "tui" => Ok(RenderMode::Terminal),
            "headless" | "log" | "none" => Ok(RenderMode::Headless),
            other => Err(anyhow!("RENDER_MODE must be 'terminal' or 'headless', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    // Source
    pub source_path: PathBuf,
    pub emit_interval: Duration,
    pub restamp_events: bool,
    pub echo_events: bool,

    // Chart
    pub chart_title: String,
    pub render_mode: RenderMode,
    pub min_frame_interval: Duration,
    pub hold_on_finish: bool,

    // Logging
    pub log_file: Option<PathBuf>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_DATA_DIR).join(DEFAULT_LIVE_DATA_FILE),
            emit_interval: Duration::from_secs_f64(DEFAULT_EMIT_INTERVAL_SECS),
            restamp_events: false,
            echo_events: false,
            chart_title: DEFAULT_CHART_TITLE.to_string(),
            render_mode: RenderMode::Terminal,
            min_frame_interval: Duration::ZERO,
            hold_on_finish: true,
            log_file: None,
        }
    }
}

impl StreamConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, map in tests, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source_path = match get("SOURCE_PATH") {
            Some(path) => PathBuf::from(path),
            None => {
                let dir = get("BASE_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
                let file =
                    get("LIVE_DATA_FILE_NAME").unwrap_or_else(|| DEFAULT_LIVE_DATA_FILE.to_string());
                PathBuf::from(dir).join(file)
            }
        };

        let emit_interval_secs = match (get("EMIT_INTERVAL_SECONDS"), get("MESSAGE_INTERVAL_SECONDS")) {
            (Some(raw), _) => parse_f64("EMIT_INTERVAL_SECONDS", &raw)?,
            (None, Some(raw)) => parse_f64("MESSAGE_INTERVAL_SECONDS", &raw)?,
            (None, None) => DEFAULT_EMIT_INTERVAL_SECS,
        };
        let emit_interval = Duration::try_from_secs_f64(emit_interval_secs)
            .map_err(|_| anyhow!("EMIT_INTERVAL_SECONDS must be >= 0, got {}", emit_interval_secs))?;

        let chart_title = get("CHART_TITLE")
            .or_else(|| get("VISUALIZATION_TITLE"))
            .unwrap_or_else(|| DEFAULT_CHART_TITLE.to_string());

        let render_mode = match get("RENDER_MODE") {
            Some(raw) => raw.parse()?,
            None => RenderMode::Terminal,
        };

        let min_frame_interval_ms = match get("MIN_FRAME_INTERVAL_MS") {
            Some(raw) => parse_u64("MIN_FRAME_INTERVAL_MS", &raw)?,
            None => 0,
        };

        Ok(Self {
            source_path,
            emit_interval,
            restamp_events: parse_bool_or("RESTAMP_EVENTS", get("RESTAMP_EVENTS"), false)?,
            echo_events: parse_bool_or("ECHO_EVENTS", get("ECHO_EVENTS"), false)?,
            chart_title,
            render_mode,
            min_frame_interval: Duration::from_millis(min_frame_interval_ms),
            hold_on_finish: parse_bool_or("HOLD_ON_FINISH", get("HOLD_ON_FINISH"), true)?,
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }
}

/// Parse a value as f64, naming the variable on failure
fn parse_f64(var_name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a valid number, got '{}'", var_name, raw))
}

/// Parse a value as u64, naming the variable on failure
fn parse_u64(var_name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a valid u64, got '{}'", var_name, raw))
}

fn parse_bool_or(var_name: &str, raw: Option<String>, default: bool) -> Result<bool> {
    match raw.map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("{} must be true or false, got '{}'", var_name, v)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Tests go through from_lookup so they never race on process environment.
    fn config(pairs: &[(&str, &str)]) -> Result<StreamConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StreamConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.source_path, PathBuf::from("data/wnba_playoffs_live.json"));
        assert_eq!(cfg.emit_interval, Duration::from_secs(3));
        assert_eq!(cfg.chart_title, DEFAULT_CHART_TITLE);
        assert_eq!(cfg.render_mode, RenderMode::Terminal);
        assert_eq!(cfg.min_frame_interval, Duration::ZERO);
        assert!(cfg.hold_on_finish);
        assert!(!cfg.restamp_events);
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn test_legacy_names() {
        let cfg = config(&[
            ("BASE_DATA_DIR", "feeds"),
            ("LIVE_DATA_FILE_NAME", "game7.json"),
            ("MESSAGE_INTERVAL_SECONDS", "0.5"),
            ("VISUALIZATION_TITLE", "Game 7"),
        ])
        .unwrap();
        assert_eq!(cfg.source_path, PathBuf::from("feeds/game7.json"));
        assert_eq!(cfg.emit_interval, Duration::from_millis(500));
        assert_eq!(cfg.chart_title, "Game 7");
    }

    #[test]
    fn test_new_names_take_precedence() {
        let cfg = config(&[
            ("SOURCE_PATH", "/tmp/events.json"),
            ("BASE_DATA_DIR", "ignored"),
            ("EMIT_INTERVAL_SECONDS", "0"),
            ("MESSAGE_INTERVAL_SECONDS", "9"),
            ("CHART_TITLE", "Finals"),
            ("VISUALIZATION_TITLE", "ignored"),
        ])
        .unwrap();
        assert_eq!(cfg.source_path, PathBuf::from("/tmp/events.json"));
        assert_eq!(cfg.emit_interval, Duration::ZERO);
        assert_eq!(cfg.chart_title, "Finals");
    }

    #[test]
    fn test_render_options() {
        let cfg = config(&[
            ("RENDER_MODE", "Headless"),
            ("MIN_FRAME_INTERVAL_MS", "250"),
            ("HOLD_ON_FINISH", "no"),
            ("RESTAMP_EVENTS", "true"),
            ("ECHO_EVENTS", "1"),
            ("LOG_FILE", "stream.log"),
        ])
        .unwrap();
        assert_eq!(cfg.render_mode, RenderMode::Headless);
        assert_eq!(cfg.min_frame_interval, Duration::from_millis(250));
        assert!(!cfg.hold_on_finish);
        assert!(cfg.restamp_events);
        assert!(cfg.echo_events);
        assert_eq!(cfg.log_file, Some(PathBuf::from("stream.log")));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config(&[("EMIT_INTERVAL_SECONDS", "soon")]).is_err());
        assert!(config(&[("EMIT_INTERVAL_SECONDS", "-1")]).is_err());
        assert!(config(&[("RENDER_MODE", "hologram")]).is_err());
        assert!(config(&[("HOLD_ON_FINISH", "maybe")]).is_err());
        assert!(config(&[("MIN_FRAME_INTERVAL_MS", "-5")]).is_err());
    }

    #[test]
    fn test_blank_value_falls_back_to_default() {
        let cfg = config(&[("CHART_TITLE", "  "), ("EMIT_INTERVAL_SECONDS", "")]).unwrap();
        assert_eq!(cfg.chart_title, DEFAULT_CHART_TITLE);
        assert_eq!(cfg.emit_interval, Duration::from_secs(3));
    }
}
