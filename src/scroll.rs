//! Scroll-and-settle for infinite-scroll pages
//!
//! Scrolls one step at a time, waits for content to load, and stops after
//! `max_steps` attempts or `idle_threshold` consecutive steps without the
//! page growing. There is no cancellation once started.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScrollConfig;

/// The host page being scrolled
pub trait ScrollSurface {
    /// Height of the visible area, the default step size
    fn viewport_height(&self) -> f64;

    /// Current total document height
    fn scroll_height(&self) -> f64;

    fn scroll_by(&mut self, delta: f64);

    fn scroll_to_bottom(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollReport {
    pub steps_taken: u32,
    pub final_height: f64,
}

/// Per-request overrides of the configured pacing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOptions {
    pub step: Option<f64>,
    pub max_steps: Option<u32>,
    pub idle_threshold: Option<u32>,
    /// Settle time in milliseconds
    pub wait: Option<u64>,
}

impl ScrollOptions {
    /// `base` with every given option laid over it
    pub fn apply(&self, base: &ScrollConfig) -> ScrollConfig {
        ScrollConfig {
            step: self.step.or(base.step),
            max_steps: self.max_steps.unwrap_or(base.max_steps),
            idle_threshold: self.idle_threshold.unwrap_or(base.idle_threshold),
            wait_ms: self.wait.unwrap_or(base.wait_ms),
            growth_tolerance: base.growth_tolerance,
        }
    }
}

pub async fn auto_scroll<S: ScrollSurface>(surface: &mut S, config: &ScrollConfig) -> ScrollReport {
    let step = config.step.unwrap_or_else(|| surface.viewport_height());
    let mut steps = 0;
    let mut idle = 0;
    let mut last_height = surface.scroll_height();

    while steps < config.max_steps && idle < config.idle_threshold {
        surface.scroll_by(step);
        tokio::time::sleep(config.wait()).await;

        let height = surface.scroll_height();
        if height <= last_height + config.growth_tolerance {
            idle += 1;
        } else {
            idle = 0;
        }
        debug!(step = steps, height, idle, "scrolled");
        last_height = height;
        steps += 1;
    }

    surface.scroll_to_bottom();
    ScrollReport {
        steps_taken: steps,
        final_height: last_height,
    }
}
