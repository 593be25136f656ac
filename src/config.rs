use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Tunables for candidate scoring, smoothing and memory expiry.
///
/// The defaults are the reference behavior; hosts usually only override a
/// handful of fields through [`load_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Gap between an anchor edge and a candidate rectangle, in pixels.
    pub margin: f32,
    /// Per-frame convergence ratio toward the newly selected target, in (0, 1].
    pub smoothing_factor: f32,
    /// Bonus for a candidate landing near the previous smoothed position.
    pub previous_position_bonus: f32,
    /// Radius (pixels) within which the previous-position bonus applies.
    pub previous_position_radius: f32,
    /// How long an unseen stabilization key survives before its memory is dropped.
    pub position_memory_timeout_ms: f64,
    pub face_overlap_weight: f32,
    pub anchor_overlap_weight: f32,
    pub sibling_overlap_weight: f32,
    pub marker_overlap_weight: f32,
    /// Weak pull toward the anchor center, per pixel of center distance.
    pub distance_weight: f32,
    /// Sentinel returned for any candidate extending past the viewport.
    pub out_of_bounds_score: f32,
    /// Best scores strictly below this yield "no viable position".
    pub viability_threshold: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            smoothing_factor: 0.2,
            previous_position_bonus: 150.0,
            previous_position_radius: 50.0,
            position_memory_timeout_ms: 1000.0,
            face_overlap_weight: 10.0,
            anchor_overlap_weight: 5.0,
            sibling_overlap_weight: 10.0,
            marker_overlap_weight: 5.0,
            distance_weight: 0.1,
            out_of_bounds_score: -1000.0,
            viability_threshold: -500.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothingFactor(f32),
    #[error("position memory timeout must be positive, got {0} ms")]
    InvalidTimeout(f64),
    #[error("candidate margin must be non-negative, got {0}")]
    InvalidMargin(f32),
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(ConfigError::InvalidSmoothingFactor(self.smoothing_factor));
        }
        if !(self.position_memory_timeout_ms > 0.0) {
            return Err(ConfigError::InvalidTimeout(self.position_memory_timeout_ms));
        }
        if self.margin < 0.0 {
            return Err(ConfigError::InvalidMargin(self.margin));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    margin: Option<f32>,
    smoothing_factor: Option<f32>,
    previous_position_bonus: Option<f32>,
    previous_position_radius: Option<f32>,
    position_memory_timeout_ms: Option<f64>,
    face_overlap_weight: Option<f32>,
    anchor_overlap_weight: Option<f32>,
    sibling_overlap_weight: Option<f32>,
    marker_overlap_weight: Option<f32>,
    distance_weight: Option<f32>,
    out_of_bounds_score: Option<f32>,
    viability_threshold: Option<f32>,
}

/// Load a config overlay from a JSON file, merged over the defaults.
///
/// `None` returns the defaults unchanged.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PlacementConfig> {
    let mut config = PlacementConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(v) = parsed.margin {
        config.margin = v;
    }
    if let Some(v) = parsed.smoothing_factor {
        config.smoothing_factor = v;
    }
    if let Some(v) = parsed.previous_position_bonus {
        config.previous_position_bonus = v;
    }
    if let Some(v) = parsed.previous_position_radius {
        config.previous_position_radius = v;
    }
    if let Some(v) = parsed.position_memory_timeout_ms {
        config.position_memory_timeout_ms = v;
    }
    if let Some(v) = parsed.face_overlap_weight {
        config.face_overlap_weight = v;
    }
    if let Some(v) = parsed.anchor_overlap_weight {
        config.anchor_overlap_weight = v;
    }
    if let Some(v) = parsed.sibling_overlap_weight {
        config.sibling_overlap_weight = v;
    }
    if let Some(v) = parsed.marker_overlap_weight {
        config.marker_overlap_weight = v;
    }
    if let Some(v) = parsed.distance_weight {
        config.distance_weight = v;
    }
    if let Some(v) = parsed.out_of_bounds_score {
        config.out_of_bounds_score = v;
    }
    if let Some(v) = parsed.viability_threshold {
        config.viability_threshold = v;
    }

    config.validate()?;
    Ok(config)
}
