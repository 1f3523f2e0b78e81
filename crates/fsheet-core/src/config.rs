#![forbid(unsafe_code)]

//! Tunable parameters for the bottom sheet.
//!
//! Every constant the sheet uses lives in [`SheetConfig`] so hosts can
//! adjust behaviour without code changes. With the `config` feature the
//! whole tree can be loaded from TOML or JSON:
//!
//! ```toml
//! [geometry]
//! half_height_ratio = 0.6
//! density = 2.75
//!
//! [gesture]
//! swipe_logic = "velocity"
//!
//! [animation]
//! settle_duration_ms = 250
//! ```
//!
//! ```rust,ignore
//! let config = SheetConfig::from_toml_file("sheet.toml")?;
//! ```
//!
//! # Defaults
//!
//! `SheetConfig::default()` reproduces the stock sheet: a 0.55 half ratio,
//! 0.5/0.3 release thresholds, a 218ms decelerating settle and a 160dp
//! minimum distance between the half and full states.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::Interpolator;

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Which rule decides whether a gesture on a closed sheet may move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum SwipeLogic {
    /// The whole toolbar is swipeable.
    #[default]
    Default,
    /// Only a centred band of the toolbar is swipeable.
    RestrictArea,
    /// The gesture must be fast enough to count as intentional.
    Velocity,
}

/// Height ratio and distance parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GeometryConfig {
    /// Height ratio of the half state.
    pub half_height_ratio: f32,
    /// Height of the shadow drawn above the toolbar, in px.
    pub toolbar_shadow_height_px: f32,
    /// Minimum distance between half and full (dp) for the half state to exist.
    pub min_half_full_distance_dp: f32,
    /// Pixels per dp.
    pub density: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            half_height_ratio: 0.55,
            toolbar_shadow_height_px: 8.0,
            min_half_full_distance_dp: 160.0,
            density: 1.0,
        }
    }
}

impl GeometryConfig {
    /// Minimum half-to-full distance converted to px.
    #[inline]
    pub fn min_half_full_distance_px(&self) -> f32 {
        self.min_half_full_distance_dp * self.density
    }

    #[must_use]
    pub fn with_half_height_ratio(mut self, ratio: f32) -> Self {
        self.half_height_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_toolbar_shadow_height_px(mut self, px: f32) -> Self {
        self.toolbar_shadow_height_px = px;
        self
    }

    #[must_use]
    pub fn with_min_half_full_distance_dp(mut self, dp: f32) -> Self {
        self.min_half_full_distance_dp = dp;
        self
    }

    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Release thresholds and swipe gating.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GestureConfig {
    /// Fraction of the way to the next state needed when three states are active.
    pub threshold_three_states: f32,
    /// Same as `threshold_three_states` when the half state is skipped.
    pub threshold_two_states: f32,
    /// Minimum swipe speed (dp/ms) for [`SwipeLogic::Velocity`].
    pub min_swipe_velocity_dp_per_ms: f32,
    /// Fraction of the container width swipeable under [`SwipeLogic::RestrictArea`].
    pub swipe_allowed_fraction: f32,
    /// Rule applied to gestures on a closed sheet.
    pub swipe_logic: SwipeLogic,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold_three_states: 0.5,
            threshold_two_states: 0.3,
            min_swipe_velocity_dp_per_ms: 0.2,
            swipe_allowed_fraction: 0.2,
            swipe_logic: SwipeLogic::Default,
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub fn with_thresholds(mut self, three_states: f32, two_states: f32) -> Self {
        self.threshold_three_states = three_states;
        self.threshold_two_states = two_states;
        self
    }

    #[must_use]
    pub fn with_min_swipe_velocity(mut self, dp_per_ms: f32) -> Self {
        self.min_swipe_velocity_dp_per_ms = dp_per_ms;
        self
    }

    #[must_use]
    pub fn with_swipe_allowed_fraction(mut self, fraction: f32) -> Self {
        self.swipe_allowed_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_swipe_logic(mut self, logic: SwipeLogic) -> Self {
        self.swipe_logic = logic;
        self
    }
}

/// Settle animation parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct AnimationConfig {
    /// Base duration of the settle animation.
    pub settle_duration_ms: u64,
    /// Curve applied to the animation progress.
    pub interpolator: Interpolator,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            settle_duration_ms: 218,
            interpolator: Interpolator::Decelerate { factor: 1.0 },
        }
    }
}

impl AnimationConfig {
    /// Settle duration as a [`std::time::Duration`].
    #[inline]
    pub fn settle_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_duration_ms)
    }

    #[must_use]
    pub fn with_settle_duration_ms(mut self, ms: u64) -> Self {
        self.settle_duration_ms = ms;
        self
    }

    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }
}

// ---------------------------------------------------------------------------
// Top-level SheetConfig
// ---------------------------------------------------------------------------

/// All tunable parameters of the bottom sheet.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetConfig {
    pub geometry: GeometryConfig,
    pub gesture: GestureConfig,
    pub animation: AnimationConfig,
}

impl SheetConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }

    #[must_use]
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    /// Load from a TOML string. The result is validated.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.into_validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string. The result is validated.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.into_validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(vec![e.to_string()]))
    }

    /// Return `self` if [`validate`](Self::validate) reports nothing.
    pub fn into_validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let g = &self.geometry;
        let s = &self.gesture;

        if !(g.half_height_ratio > 0.0 && g.half_height_ratio < 1.0) {
            errors.push(format!(
                "geometry.half_height_ratio must be in (0, 1), got {}",
                g.half_height_ratio
            ));
        }
        if !(g.toolbar_shadow_height_px >= 0.0) {
            errors.push(format!(
                "geometry.toolbar_shadow_height_px must be >= 0, got {}",
                g.toolbar_shadow_height_px
            ));
        }
        if !(g.min_half_full_distance_dp >= 0.0) {
            errors.push(format!(
                "geometry.min_half_full_distance_dp must be >= 0, got {}",
                g.min_half_full_distance_dp
            ));
        }
        if !(g.density > 0.0) {
            errors.push(format!("geometry.density must be > 0, got {}", g.density));
        }

        for (name, value) in [
            ("gesture.threshold_three_states", s.threshold_three_states),
            ("gesture.threshold_two_states", s.threshold_two_states),
            ("gesture.swipe_allowed_fraction", s.swipe_allowed_fraction),
        ] {
            if !(value > 0.0 && value < 1.0) {
                errors.push(format!("{name} must be in (0, 1), got {value}"));
            }
        }
        if !(s.min_swipe_velocity_dp_per_ms >= 0.0) {
            errors.push(format!(
                "gesture.min_swipe_velocity_dp_per_ms must be >= 0, got {}",
                s.min_swipe_velocity_dp_per_ms
            ));
        }

        if let Interpolator::Decelerate { factor } = self.animation.interpolator {
            if !(factor > 0.0) {
                errors.push(format!(
                    "animation.interpolator decelerate factor must be > 0, got {factor}"
                ));
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`SheetConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
