use std::sync::Arc;

use glam::Vec3;

use super::{Embedding, ShaderFragment};
use crate::geometry::axis::Axis;

/// Exchanges two components. Its own inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAxes {
    pub a: Axis,
    pub b: Axis,
}

impl SwapAxes {
    pub const fn new(a: Axis, b: Axis) -> Self {
        Self { a, b }
    }

    fn swap(&self, v: Vec3) -> Vec3 {
        let mut out = v;
        out[self.a.index()] = v[self.b.index()];
        out[self.b.index()] = v[self.a.index()];
        out
    }
}

impl Embedding for SwapAxes {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn shader(&self) -> ShaderFragment {
        match (self.a, self.b) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => ShaderFragment::SwapXY,
            (Axis::X, Axis::Z) | (Axis::Z, Axis::X) => ShaderFragment::SwapXZ,
            (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => ShaderFragment::SwapYZ,
            _ => ShaderFragment::Cartesian,
        }
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        self.swap(v)
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        self.swap(v)
    }
}

/// `outer ∘ inner`: embeds with `inner` first, inverts with `outer` first.
///
/// The normalized domain is the inner embedding's, so wrapping and the
/// angular axis come from `inner`.
#[derive(Debug, Clone)]
pub struct Composed {
    name: &'static str,
    outer: Arc<dyn Embedding>,
    inner: Arc<dyn Embedding>,
}

impl Composed {
    pub fn new(name: &'static str, outer: Arc<dyn Embedding>, inner: Arc<dyn Embedding>) -> Self {
        Self { name, outer, inner }
    }
}

impl Embedding for Composed {
    fn name(&self) -> &'static str {
        self.name
    }

    /// The outermost step; see [`shader_chain`](Embedding::shader_chain) for
    /// the whole program.
    fn shader(&self) -> ShaderFragment {
        self.outer.shader()
    }

    fn shader_chain(&self) -> Vec<ShaderFragment> {
        let mut chain = self.inner.shader_chain();
        chain.extend(self.outer.shader_chain());
        chain
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        self.outer.embed(self.inner.embed(v))
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        self.inner.invert(self.outer.invert(v))
    }

    fn angular_axis(&self) -> Option<Axis> {
        self.inner.angular_axis()
    }

    fn center(&self) -> Vec3 {
        self.outer.embed(self.inner.center())
    }
}
