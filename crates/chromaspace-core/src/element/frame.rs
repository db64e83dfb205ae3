//! Per-frame draw instructions handed to a [`FrameRenderer`](super::FrameRenderer).
//!
//! A frame holds everything the visible scene and the pick scene need to
//! agree on, so a pick made against the last frame sees exactly the geometry
//! that was on screen.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use super::cursor::CursorInstance;
use crate::embedding::Embedding;
use crate::geometry::axis::Axis;
use crate::motion::camera::CameraPose;

/// Smallest slice extent; keeps the sliced volume from degenerating.
pub const MIN_SLICE: f32 = 1e-3;

/// Alpha the pick scene writes where geometry is present.
pub const PICK_TAG: f32 = 1.0;

/// How much of the unit volume is kept along each axis.
///
/// The volume is scaled before embedding, so its exposed face sits at the
/// tracked color component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceGeometry {
    pub extent: Vec3,
}

impl SliceGeometry {
    pub const FULL: SliceGeometry = SliceGeometry { extent: Vec3::ONE };

    pub fn new(extent: Vec3) -> Self {
        Self {
            extent: extent.clamp(Vec3::splat(MIN_SLICE), Vec3::ONE),
        }
    }

    /// Pre-embedding matrix applied to mesh coordinates.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale(self.extent)
    }
}

impl Default for SliceGeometry {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone)]
pub struct SpaceFrame {
    pub width: u32,
    pub height: u32,
    pub pose: CameraPose,
    pub view_proj: Mat4,
    pub slice: SliceGeometry,
    pub layout: Arc<dyn Embedding>,
    pub shading: Arc<dyn Embedding>,
    pub cursors: Vec<CursorInstance>,
}

impl SpaceFrame {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone)]
pub struct AxisFrame {
    pub width: u32,
    pub height: u32,
    pub axis: Axis,
    /// Maps the strip's [0,1]² plane onto the viewport.
    pub view_proj: Mat4,
    /// Maps the strip's [0,1]² plane to color coordinates.
    pub embed_matrix: Mat4,
    pub shading: Arc<dyn Embedding>,
    pub cursors: Vec<CursorInstance>,
}

/// Projection for a strip: the unit square fills the viewport.
pub fn strip_projection() -> Mat4 {
    Mat4::orthographic_rh(0.0, 1.0, 0.0, 1.0, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_extent_is_floored() {
        let slice = SliceGeometry::new(Vec3::new(0.0, 0.5, 2.0));
        assert_eq!(slice.extent, Vec3::new(MIN_SLICE, 0.5, 1.0));
        let p = slice.matrix().transform_point3(Vec3::ONE);
        assert_eq!(p, slice.extent);
    }

    #[test]
    fn test_strip_projection_fills_clip_space() {
        let m = strip_projection();
        let lo = m.project_point3(Vec3::ZERO);
        let hi = m.project_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((lo.truncate() - glam::Vec2::splat(-1.0)).length() < 1e-6);
        assert!((hi.truncate() - glam::Vec2::splat(1.0)).length() < 1e-6);
    }
}
