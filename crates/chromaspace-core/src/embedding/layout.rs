use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use glam::Vec3;
use palette::{FromColor, LinSrgb, Oklab, Srgb};
use serde::{Deserialize, Serialize};

use super::{Composed, Embedding, ShaderFragment, SwapAxes};
use crate::error::ChromaError;
use crate::geometry::axis::Axis;
use crate::geometry::vec::wrap_unit;

/// The unit cube as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cartesian;

impl Embedding for Cartesian {
    fn name(&self) -> &'static str {
        "cartesian"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Cartesian
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        v
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        v
    }
}

/// `(turn, height, radius)` wrapped around the Y axis.
///
/// ```text
///   embed:  (t, h, r) -> (r·cos 2πt, h, r·sin 2πt)
///   invert: (x, y, z) -> (atan2(z, x) / 2π mod 1, y, √(x² + z²))
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Cylindrical;

impl Embedding for Cylindrical {
    fn name(&self) -> &'static str {
        "cylindrical"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Cylindrical
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        let angle = v.x * TAU;
        Vec3::new(v.z * angle.cos(), v.y, v.z * angle.sin())
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        let turn = wrap_unit(v.z.atan2(v.x) / TAU);
        Vec3::new(turn, v.y, v.x.hypot(v.z))
    }

    fn angular_axis(&self) -> Option<Axis> {
        Some(Axis::X)
    }

    fn center(&self) -> Vec3 {
        Vec3::new(0.0, 0.5, 0.0)
    }
}

/// sRGB channels placed at their Oklab `(L, a, b)` position.
///
/// Lightness lands on X; [`SpaceLayout::Oklab`] swaps it onto Y.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrgbToOklab;

impl Embedding for SrgbToOklab {
    fn name(&self) -> &'static str {
        "srgb-oklab"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Oklab
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        let linear: LinSrgb = Srgb::new(v.x, v.y, v.z).into_linear();
        let lab = Oklab::from_color(linear);
        Vec3::new(lab.l, lab.a, lab.b)
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        let linear: LinSrgb = LinSrgb::from_color(Oklab::new(v.x, v.y, v.z));
        let rgb: Srgb = Srgb::from_linear(linear);
        Vec3::new(rgb.red, rgb.green, rgb.blue)
    }

    fn center(&self) -> Vec3 {
        self.embed(Vec3::splat(0.5))
    }
}

/// Shape of the Space widget's volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceLayout {
    #[default]
    Cube,
    Cylinder,
    /// The sRGB gamut in Oklab, lightness up.
    Oklab,
}

impl SpaceLayout {
    pub fn embedding(self) -> Arc<dyn Embedding> {
        match self {
            Self::Cube => Arc::new(Cartesian),
            Self::Cylinder => Arc::new(Cylindrical),
            Self::Oklab => Arc::new(Composed::new(
                "oklab",
                Arc::new(SwapAxes::new(Axis::X, Axis::Y)),
                Arc::new(SrgbToOklab),
            )),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Cylinder => "cylinder",
            Self::Oklab => "oklab",
        }
    }
}

impl FromStr for SpaceLayout {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cube" | "cartesian" => Ok(Self::Cube),
            "cylinder" | "cylindrical" => Ok(Self::Cylinder),
            "oklab" => Ok(Self::Oklab),
            _ => Err(ChromaError::UnknownEmbedding(s.to_string())),
        }
    }
}

impl fmt::Display for SpaceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
