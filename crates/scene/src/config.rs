use std::path::Path;

use foundation::ease::Ease;
use serde::{Deserialize, Serialize};

/// Tunables of one globe session.
///
/// Every field has a default, so a JSON file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Globe sphere radius in scene units.
    pub radius: f64,
    /// Distance a marker floats above the surface along its normal.
    pub marker_offset: f64,
    /// Radius of a marker's pick sphere.
    pub pick_radius: f64,
    pub drag: DragConfig,
    pub zoom: ZoomConfig,
    pub rotation: RotationConfig,
    pub auto_rotate: AutoRotateConfig,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            marker_offset: 0.18 * 0.4,
            pick_radius: 0.12,
            drag: DragConfig::default(),
            zoom: ZoomConfig::default(),
            rotation: RotationConfig::default(),
            auto_rotate: AutoRotateConfig::default(),
            fov_y_deg: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Radians per pixel before sensitivity.
    pub speed: f64,
    pub sensitivity: f64,
    /// Release velocity (either axis) above which decay starts.
    pub inertia_threshold: f64,
    /// Per-frame velocity multiplier while decaying.
    pub damping: f64,
    /// Decay ends once both velocity components fall below this.
    pub stop_threshold: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            speed: 0.005,
            sensitivity: 1.2,
            inertia_threshold: 0.001,
            damping: 0.92,
            stop_threshold: 0.0001,
        }
    }
}

impl DragConfig {
    pub fn radians_per_px(&self) -> f64 {
        self.speed * self.sensitivity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub initial_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Wheel distance per unit of `delta_y` is `wheel_speed * wheel_scale`.
    pub wheel_speed: f64,
    pub wheel_scale: f64,
    /// Distance change of the zoom buttons.
    pub button_step: f64,
    pub duration_s: f64,
    pub ease: Ease,
    pub focus_distance: f64,
    pub focus_duration_s: f64,
    pub restore_duration_s: f64,
    pub focus_ease: Ease,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial_distance: 12.0,
            min_distance: 7.0,
            max_distance: 30.0,
            wheel_speed: 0.8,
            wheel_scale: 0.01,
            button_step: 1.0,
            duration_s: 0.5,
            ease: Ease::Power2Out,
            focus_distance: 8.8,
            focus_duration_s: 1.5,
            restore_duration_s: 1.0,
            focus_ease: Ease::Power2InOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub duration_s: f64,
    pub ease: Ease,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            duration_s: 1.5,
            ease: Ease::Power2Out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRotateConfig {
    /// Idle yaw speed in radians per second. Zero disables the spin.
    pub speed: f64,
    /// Pause after an interaction before the spin resumes.
    pub pause_s: f64,
}

impl Default for AutoRotateConfig {
    fn default() -> Self {
        Self {
            speed: 0.0,
            pause_s: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config io error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GlobeConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        };
        positive("radius", self.radius)?;
        positive("pick_radius", self.pick_radius)?;
        positive("fov_y_deg", self.fov_y_deg)?;
        positive("zoom.min_distance", self.zoom.min_distance)?;
        if self.fov_y_deg >= 180.0 {
            return Err(ConfigError::Invalid("fov_y_deg must be below 180".to_string()));
        }
        if self.zoom.min_distance > self.zoom.max_distance {
            return Err(ConfigError::Invalid(
                "zoom.min_distance exceeds zoom.max_distance".to_string(),
            ));
        }
        if !(self.drag.damping > 0.0 && self.drag.damping < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "drag.damping must be in (0, 1), got {}",
                self.drag.damping
            )));
        }
        if !(self.marker_offset.is_finite() && self.marker_offset >= 0.0) {
            return Err(ConfigError::Invalid("marker_offset must be non-negative".to_string()));
        }
        Ok(())
    }
}
