//! Thin helpers over glam's vector and matrix types.

use std::f32::consts::{PI, TAU};

pub use glam::{Mat4, Vec2, Vec3, Vec4};

use super::axis::Axis;

/// Distance below which two color coordinates are considered the same.
pub const NEAR_EPSILON: f32 = 1e-6;

/// True when the Euclidean distance between `a` and `b` is below `eps`.
pub fn near(a: Vec3, b: Vec3, eps: f32) -> bool {
    a.distance(b) < eps
}

pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Clamp every component into [0, 1].
pub fn clamp_vec3(v: Vec3) -> Vec3 {
    v.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Wrap a value into [0, 1).
pub fn wrap_unit(v: f32) -> f32 {
    let wrapped = v.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Wrap one component of `v` into [0, 1), leaving the others untouched.
pub fn wrap_axis(axis: Axis, v: Vec3) -> Vec3 {
    let mut out = v;
    out[axis.index()] = wrap_unit(v[axis.index()]);
    out
}

/// Wrap an angle into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Spherical to cartesian with `theta` as latitude above the XZ plane and
/// `phi` as azimuth around Y.
pub fn spherical_to_cartesian(theta: f32, phi: f32, radius: f32) -> Vec3 {
    Vec3::new(
        radius * theta.cos() * phi.cos(),
        radius * theta.sin(),
        radius * theta.cos() * phi.sin(),
    )
}
