//! Color channel axes and every per-axis mapping the widgets need.
//!
//! Axis-dependent behavior is kept here, one table per behavior, so the
//! widgets never branch on the axis themselves.

use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ChromaError;

/// One channel of the normalized color coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Which screen direction an axis strip runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripOrientation {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    pub fn component(self, v: Vec3) -> f32 {
        v[self.index()]
    }

    /// Copy of `v` with this axis' component replaced.
    pub fn with_component(self, v: Vec3, value: f32) -> Vec3 {
        let mut out = v;
        out[self.index()] = value;
        out
    }

    /// The Y channel runs vertically, X and Z horizontally.
    pub const fn orientation(self) -> StripOrientation {
        match self {
            Self::X | Self::Z => StripOrientation::Horizontal,
            Self::Y => StripOrientation::Vertical,
        }
    }

    /// Normalized position along a strip of the given size.
    ///
    /// `pointer` uses a bottom-left origin, so the Y strip grows upward.
    pub fn strip_value(self, pointer: Vec2, size: Vec2) -> f32 {
        let t = match self.orientation() {
            StripOrientation::Horizontal => pointer.x / size.x,
            StripOrientation::Vertical => pointer.y / size.y,
        };
        t.clamp(0.0, 1.0)
    }

    /// Matrix taking the strip's [0,1]² plane (u, v, 0) to color coordinates
    /// that vary only along this axis around `pos`.
    ///
    /// X and Z strips read `u`, the Y strip reads `v`.
    pub fn strip_matrix(self, pos: Vec3) -> Mat4 {
        match self {
            Self::X => Mat4::from_cols(
                Vec4::X,
                Vec4::ZERO,
                Vec4::ZERO,
                Vec4::new(0.0, pos.y, pos.z, 1.0),
            ),
            Self::Y => Mat4::from_cols(
                Vec4::ZERO,
                Vec4::Y,
                Vec4::ZERO,
                Vec4::new(pos.x, 0.0, pos.z, 1.0),
            ),
            Self::Z => Mat4::from_cols(
                Vec4::Z,
                Vec4::ZERO,
                Vec4::ZERO,
                Vec4::new(pos.x, pos.y, 0.0, 1.0),
            ),
        }
    }

    /// Where a cursor for color `v` sits on the strip's [0,1]² plane.
    pub fn strip_cursor(self, v: Vec3) -> Vec3 {
        match self.orientation() {
            StripOrientation::Horizontal => Vec3::new(self.component(v), 0.5, 0.0),
            StripOrientation::Vertical => Vec3::new(0.5, self.component(v), 0.0),
        }
    }
}

impl TryFrom<u8> for Axis {
    type Error = ChromaError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            other => Err(ChromaError::UnknownAxis(other.to_string())),
        }
    }
}

impl FromStr for Axis {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "0" => Ok(Self::X),
            "y" | "1" => Ok(Self::Y),
            "z" | "2" => Ok(Self::Z),
            _ => Err(ChromaError::UnknownAxis(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_unknown_axis_index_is_rejected() {
        assert_eq!(Axis::try_from(1).ok(), Some(Axis::Y));
        let err = Axis::try_from(3).unwrap_err();
        assert!(matches!(err, ChromaError::UnknownAxis(ref s) if s == "3"));
        assert!("w".parse::<Axis>().is_err());
    }

    #[test]
    fn test_strip_matrix_varies_only_own_axis() {
        let pos = Vec3::new(0.2, 0.4, 0.6);
        for axis in Axis::ALL {
            let m = axis.strip_matrix(pos);
            let at = |u: f32, v: f32| m.transform_point3(Vec3::new(u, v, 0.0));
            let sample = match axis.orientation() {
                StripOrientation::Horizontal => at(0.75, 0.3),
                StripOrientation::Vertical => at(0.3, 0.75),
            };
            for other in Axis::ALL {
                let expected = if other == axis {
                    0.75
                } else {
                    other.component(pos)
                };
                assert!(
                    (other.component(sample) - expected).abs() < EPSILON,
                    "{axis} strip, channel {other}: {sample:?}"
                );
            }
        }
    }

    #[test]
    fn test_strip_value_is_clamped_and_oriented() {
        let size = Vec2::new(200.0, 100.0);
        assert!((Axis::X.strip_value(Vec2::new(50.0, 90.0), size) - 0.25).abs() < EPSILON);
        assert!((Axis::Y.strip_value(Vec2::new(50.0, 90.0), size) - 0.9).abs() < EPSILON);
        assert_eq!(Axis::Z.strip_value(Vec2::new(-10.0, 0.0), size), 0.0);
        assert_eq!(Axis::Z.strip_value(Vec2::new(500.0, 0.0), size), 1.0);
    }
}
