//! The pick contract: pointer position to normalized color coordinate.

use glam::{Vec3, Vec4};

use super::frame::SpaceFrame;
use crate::embedding::Embedding;

/// Resolves a canvas position against the geometry of a frame.
///
/// Implementations re-render the pick scene on every call; `None` means
/// nothing was under the pointer or the pick could not be completed.
pub trait PickPipeline {
    /// `x`, `y` are canvas-local with a bottom-left origin.
    fn pick(&mut self, frame: &SpaceFrame, x: f32, y: f32) -> Option<Vec3>;

    /// The layout or shading changed; drop anything built for the old one.
    fn embedding_changed(&mut self, _layout: &dyn Embedding) {}
}

/// Decode one texel of the pick target.
///
/// RGB hold the pre-embedding coordinate, alpha the presence tag. A zero
/// tag means nothing was drawn there.
pub fn decode_pick_texel(texel: [f32; 4]) -> Option<Vec3> {
    let texel = Vec4::from_array(texel);
    if texel.w == 0.0 || !texel.is_finite() {
        return None;
    }
    Some(texel.truncate())
}

/// Whether `(x, y)` falls inside a `width × height` viewport.
pub fn in_viewport(x: f32, y: f32, width: u32, height: u32) -> bool {
    x >= 0.0 && y >= 0.0 && x < width as f32 && y < height as f32
}

/// A picker that never hits anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPick;

impl PickPipeline for NoPick {
    fn pick(&mut self, _frame: &SpaceFrame, _x: f32, _y: f32) -> Option<Vec3> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_alpha_is_a_miss() {
        assert_eq!(decode_pick_texel([0.3, 0.4, 0.5, 0.0]), None);
        assert_eq!(decode_pick_texel([0.0, 0.0, 0.0, 1.0]), Some(Vec3::ZERO));
        assert_eq!(
            decode_pick_texel([0.3, 0.4, 0.5, 1.0]),
            Some(Vec3::new(0.3, 0.4, 0.5))
        );
        assert_eq!(decode_pick_texel([f32::NAN, 0.0, 0.0, 1.0]), None);
    }

    #[test]
    fn test_viewport_bounds() {
        assert!(in_viewport(0.0, 0.0, 10, 10));
        assert!(in_viewport(9.5, 9.5, 10, 10));
        assert!(!in_viewport(10.0, 5.0, 10, 10));
        assert!(!in_viewport(-0.5, 5.0, 10, 10));
    }
}
