use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{EngineError, Result};

/// What the playback timer does after the last movement event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfPlayback {
    /// Cancel the timer and park the index at 0.
    #[default]
    Stop,
    /// Wrap to index 0 and keep playing.
    Loop,
}

/// Where wheel zoom is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomAnchor {
    #[default]
    Center,
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied per wheel notch when zooming in; its inverse zooms out.
    pub wheel_zoom_step: f64,
    /// Screen pixels per world unit at zoom 1.
    pub cell_size: f64,
    /// Major grid lines every N world units.
    pub grid_major_every: i64,
    pub hit_radius_px: f64,
    pub playback_interval_ms: u64,
    pub end_of_playback: EndOfPlayback,
    pub zoom_anchor: ZoomAnchor,
    /// Press/release travel below this is treated as a click, not a drag.
    pub drag_threshold_px: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
            wheel_zoom_step: 1.1,
            cell_size: 20.0,
            grid_major_every: 10,
            hit_radius_px: 12.0,
            playback_interval_ms: 500,
            end_of_playback: EndOfPlayback::Stop,
            zoom_anchor: ZoomAnchor::Center,
            drag_threshold_px: 3.0,
        }
    }
}

impl MapConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("wheel_zoom_step", self.wheel_zoom_step),
            ("cell_size", self.cell_size),
            ("hit_radius_px", self.hit_radius_px),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(EngineError::config(format!("{name} must be positive, got {v}")));
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(EngineError::config(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.wheel_zoom_step <= 1.0 {
            return Err(EngineError::config("wheel_zoom_step must be greater than 1"));
        }
        if self.grid_major_every <= 0 {
            return Err(EngineError::config("grid_major_every must be positive"));
        }
        if self.playback_interval_ms == 0 {
            return Err(EngineError::config("playback_interval_ms must be positive"));
        }
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            return Err(EngineError::config("drag_threshold_px must be non-negative"));
        }
        Ok(())
    }

    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback_interval_ms)
    }
}
