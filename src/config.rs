//! Scanner configuration
//!
//! Thresholds for the detectors, preview sizes and auto-scroll pacing.
//! Every field has a default so a partial TOML file is enough.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ScanError;

/// Configuration for a [`PageScanner`](crate::scanner::PageScanner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Rows included in previews handed back to callers
    pub preview_rows: usize,

    /// Maximum characters of a header-derived table label
    pub label_max_chars: usize,

    /// Minimum qualifying children for a list to count as data
    pub min_list_items: usize,

    /// Minimum `role="row"` descendants for an ARIA grid
    pub min_grid_rows: usize,

    /// Minimum children sharing a class to form a card cluster
    pub card_min_repeats: usize,

    /// Smallest direct-child count of a card container
    pub card_min_children: usize,

    /// Largest direct-child count of a card container
    pub card_max_children: usize,

    /// Default character cap for context snapshots
    pub context_max_chars: usize,

    /// Auto-scroll pacing
    pub scroll: ScrollConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            preview_rows: 15,
            label_max_chars: 80,
            min_list_items: 2,
            min_grid_rows: 2,
            card_min_repeats: 3,
            card_min_children: 3,
            card_max_children: 200,
            context_max_chars: 6000,
            scroll: ScrollConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ScanError> {
        let config: ScanConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.min_list_items == 0 {
            return Err(ScanError::Config("min_list_items must be greater than 0".into()));
        }
        if self.min_grid_rows == 0 {
            return Err(ScanError::Config("min_grid_rows must be greater than 0".into()));
        }
        if self.card_min_repeats == 0 {
            return Err(ScanError::Config("card_min_repeats must be greater than 0".into()));
        }
        if self.card_min_children > self.card_max_children {
            return Err(ScanError::Config(
                "card_min_children cannot exceed card_max_children".into(),
            ));
        }
        self.scroll.validate()
    }
}

/// Auto-scroll pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pixels per step; `None` uses the viewport height
    pub step: Option<f64>,

    /// Hard cap on scroll attempts
    pub max_steps: u32,

    /// Consecutive no-growth observations that end the run
    pub idle_threshold: u32,

    /// Settle time between attempts (milliseconds)
    pub wait_ms: u64,

    /// Height growth at or below this many pixels counts as idle
    pub growth_tolerance: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step: None,
            max_steps: 120,
            idle_threshold: 3,
            wait_ms: 800,
            growth_tolerance: 10.0,
        }
    }
}

impl ScrollConfig {
    /// Settle time as a Duration
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.idle_threshold == 0 {
            return Err(ScanError::Config("scroll.idle_threshold must be greater than 0".into()));
        }
        if matches!(self.step, Some(step) if step <= 0.0) {
            return Err(ScanError::Config("scroll.step must be positive".into()));
        }
        Ok(())
    }
}
