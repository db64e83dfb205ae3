//! Picker configuration.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::ColorSpaceId;
use crate::element::space::Slicing;
use crate::embedding::SpaceLayout;
use crate::error::{ChromaError, Result};
use crate::motion::camera::CameraConfig;
use crate::motion::spring::SpringConfig;

/// Pointer travel, in pixels, below which a press and release count as a click.
const DEFAULT_CLICK_THRESHOLD: f32 = 1.0;

/// Everything a Space or Axis widget is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub spring: SpringConfig,
    pub camera: CameraConfig,
    pub slicing: Slicing,
    /// Shape of the Space widget's volume.
    pub layout: SpaceLayout,
    /// Space the normalized coordinates are interpreted in.
    pub color_space: ColorSpaceId,
    pub click_threshold: f32,
    /// Starting color, normalized in `color_space`.
    pub initial_color: [f32; 3],
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::default(),
            camera: CameraConfig::default(),
            slicing: Slicing::default(),
            layout: SpaceLayout::default(),
            color_space: ColorSpaceId::default(),
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            initial_color: [0.5, 0.5, 0.5],
        }
    }
}

impl PickerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn initial_color(&self) -> Vec3 {
        Vec3::from_array(self.initial_color)
    }

    /// Apply `CHROMASPACE_SLICING`, `CHROMASPACE_LAYOUT` and
    /// `CHROMASPACE_COLOR_SPACE` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with an
    /// arbitrary variable source. Unparseable values are logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("CHROMASPACE_SLICING") {
            match value.parse() {
                Ok(slicing) => self.slicing = slicing,
                Err(e) => tracing::warn!("ignoring CHROMASPACE_SLICING: {e}"),
            }
        }
        if let Some(value) = lookup("CHROMASPACE_LAYOUT") {
            match value.parse() {
                Ok(layout) => self.layout = layout,
                Err(e) => tracing::warn!("ignoring CHROMASPACE_LAYOUT: {e}"),
            }
        }
        if let Some(value) = lookup("CHROMASPACE_COLOR_SPACE") {
            match value.parse() {
                Ok(space) => self.color_space = space,
                Err(e) => tracing::warn!("ignoring CHROMASPACE_COLOR_SPACE: {e}"),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f32| {
            if v.is_finite() && (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ChromaError::Config(format!("{name} must be in [0, 1], got {v}")))
            }
        };
        unit("spring.stiffness", self.spring.stiffness)?;
        unit("spring.damping", self.spring.damping)?;
        if !(self.spring.precision.is_finite() && self.spring.precision > 0.0) {
            return Err(ChromaError::Config(format!(
                "spring.precision must be positive, got {}",
                self.spring.precision
            )));
        }
        if !(self.camera.radius.is_finite() && self.camera.radius > 0.0) {
            return Err(ChromaError::Config(format!(
                "camera.radius must be positive, got {}",
                self.camera.radius
            )));
        }
        if !(self.camera.theta.is_finite() && self.camera.phi.is_finite()) {
            return Err(ChromaError::Config("camera angles must be finite".into()));
        }
        for detent in &self.camera.detents {
            let finite = detent.angle.is_finite() && detent.threshold.is_finite();
            if !(finite && detent.threshold > 0.0) {
                return Err(ChromaError::Config(format!("invalid detent {detent:?}")));
            }
        }
        if !(self.click_threshold.is_finite() && self.click_threshold >= 0.0) {
            return Err(ChromaError::Config(format!(
                "click_threshold must be non-negative, got {}",
                self.click_threshold
            )));
        }
        for (i, c) in self.initial_color.iter().enumerate() {
            unit(&format!("initial_color[{i}]"), *c)?;
        }
        Ok(())
    }
}
