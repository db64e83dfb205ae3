//! Embeddings between normalized color coordinates and another space.
//!
//! A layout embedding (cube, cylinder, Oklab) places color coordinates in
//! render space. A shading embedding (sRGB, HSV, Okhsv, Okhsl) turns the
//! same coordinates into a display color. Both are the same trait: a pair of
//! maps plus the shader fragments that perform `embed` on the GPU.
//! Embeddings compose with [`Composed`].

mod compose;
mod layout;
mod shader;
mod shading;

pub use compose::{Composed, SwapAxes};
pub use layout::{Cartesian, Cylindrical, SpaceLayout, SrgbToOklab};
pub use shader::{ShaderBuilder, ShaderFragment};
pub use shading::{HsvShading, OkhslShading, OkhsvShading, SrgbShading};

use std::fmt;

use glam::Vec3;

use crate::geometry::axis::Axis;
use crate::geometry::vec::{clamp01, wrap_unit};

pub trait Embedding: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Fragment that applies `embed` in the shader.
    fn shader(&self) -> ShaderFragment;

    /// Every fragment `embed` needs, in application order.
    fn shader_chain(&self) -> Vec<ShaderFragment> {
        vec![self.shader()]
    }

    /// Normalized coordinate to embedded coordinate.
    fn embed(&self, v: Vec3) -> Vec3;

    /// Embedded coordinate back to the normalized coordinate.
    fn invert(&self, v: Vec3) -> Vec3;

    /// The component that is periodic, if any.
    fn angular_axis(&self) -> Option<Axis> {
        None
    }

    /// Point the camera orbits around, in embedded coordinates.
    fn center(&self) -> Vec3 {
        Vec3::splat(0.5)
    }

    /// Bring a normalized coordinate back into the domain: the angular
    /// component wraps into [0, 1), the others clamp to [0, 1].
    fn wrap(&self, v: Vec3) -> Vec3 {
        let angular = self.angular_axis();
        let mut out = v;
        for axis in Axis::ALL {
            let c = axis.component(v);
            out[axis.index()] = if Some(axis) == angular {
                wrap_unit(c)
            } else {
                clamp01(c)
            };
        }
        out
    }
}
