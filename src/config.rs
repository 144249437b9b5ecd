//! Configuration file parser for ~/.config/toc-reader/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde and logged as warnings, since they are
//! usually typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::tracker::SpringParams;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Tuning for the outline tracker.
///
/// Lengths are in the units of the geometry the tracker is attached to.
/// `Default` matches pixel geometry; [`TrackerConfig::terminal`] scales the
/// lengths for row-based geometry. Keys missing from a TOML table fall back
/// to the terminal values, since config files only configure the reader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default = "TrackerConfig::terminal")]
pub struct TrackerConfig {
    /// Minimum spacing between scroll recomputations.
    pub scroll_throttle_ms: u64,

    /// Quiet period after a navigation settles before the target is pinned.
    pub settle_delay_ms: u64,

    /// Added to the target heading's offset when navigating; negative values
    /// leave room above the heading.
    pub navigate_offset: f64,

    /// Indentation per heading level below the root level.
    pub indent_step: u16,

    pub spring_stiffness: f64,
    pub spring_damping: f64,
    pub spring_rest_delta: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let spring = SpringParams::default();
        Self {
            scroll_throttle_ms: 100,
            settle_delay_ms: 36,
            navigate_offset: -100.0,
            indent_step: 12,
            spring_stiffness: spring.stiffness,
            spring_damping: spring.damping,
            spring_rest_delta: spring.rest_delta,
        }
    }
}

impl TrackerConfig {
    /// Defaults for geometry measured in terminal rows and columns.
    pub fn terminal() -> Self {
        Self {
            navigate_offset: -2.0,
            indent_step: 2,
            spring_rest_delta: 0.5,
            ..Self::default()
        }
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn spring(&self) -> SpringParams {
        SpringParams {
            stiffness: self.spring_stiffness,
            damping: self.spring_damping,
            rest_delta: self.spring_rest_delta,
        }
    }
}

/// Top-level reader configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Show the outline sidebar when the document has headings.
    pub show_toc: bool,

    /// Sidebar width in columns.
    pub toc_width: u16,

    /// Tracker tuning (`[toc]` table).
    pub toc: TrackerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_toc: true,
            toc_width: 32,
            toc: TrackerConfig::terminal(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw);
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            show_toc = config.show_toc,
            throttle_ms = config.toc.scroll_throttle_ms,
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn warn_unknown_keys(raw: &toml::Table) {
    const TOP_LEVEL: [&str; 3] = ["show_toc", "toc_width", "toc"];
    const TOC: [&str; 7] = [
        "scroll_throttle_ms",
        "settle_delay_ms",
        "navigate_offset",
        "indent_step",
        "spring_stiffness",
        "spring_damping",
        "spring_rest_delta",
    ];

    for key in raw.keys() {
        if !TOP_LEVEL.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
        }
    }
    if let Some(toml::Value::Table(toc)) = raw.get("toc") {
        for key in toc.keys() {
            if !TOC.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Unknown key in [toc] section, ignoring");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
