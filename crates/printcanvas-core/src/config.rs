//! Editor tuning knobs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Editor configuration. Every field has a default, so partial JSON is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum entries on each of the undo and redo stacks.
    pub history_limit: usize,
    /// Canvas-space offset applied to duplicated objects (both axes).
    pub duplicate_offset: f64,
    /// Viewports narrower than this are "small".
    pub small_viewport_width: f64,
    pub touch_zoom_range: [f64; 2],
    pub pointer_zoom_range: [f64; 2],
    /// Two-finger distances below this are treated as degenerate.
    pub min_gesture_distance: f64,
    /// Fraction of the canvas a newly added image may cover.
    pub image_fit_fraction: f64,
    /// Wheel zoom factor is `wheel_zoom_base ^ delta_y`.
    pub wheel_zoom_base: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            duplicate_offset: 20.0,
            small_viewport_width: 768.0,
            touch_zoom_range: [0.5, 3.0],
            pointer_zoom_range: [0.1, 3.0],
            min_gesture_distance: 1.0,
            image_fit_fraction: 0.6,
            wheel_zoom_base: 0.999,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if self.history_limit == 0 {
            return Err(invalid("history_limit", "must be at least 1"));
        }
        if !self.duplicate_offset.is_finite() {
            return Err(invalid("duplicate_offset", "must be finite"));
        }
        if !(self.small_viewport_width.is_finite() && self.small_viewport_width > 0.0) {
            return Err(invalid("small_viewport_width", "must be positive"));
        }
        for (field, [min, max]) in [
            ("touch_zoom_range", self.touch_zoom_range),
            ("pointer_zoom_range", self.pointer_zoom_range),
        ] {
            if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
                return Err(invalid(field, "expected 0 < min <= max"));
            }
        }
        if !(self.min_gesture_distance.is_finite() && self.min_gesture_distance >= 0.0) {
            return Err(invalid("min_gesture_distance", "must be non-negative"));
        }
        if !(self.image_fit_fraction > 0.0 && self.image_fit_fraction <= 1.0) {
            return Err(invalid("image_fit_fraction", "must be in (0, 1]"));
        }
        if !(self.wheel_zoom_base > 0.0 && self.wheel_zoom_base < 1.0) {
            return Err(invalid("wheel_zoom_base", "must be in (0, 1)"));
        }
        Ok(())
    }
}
