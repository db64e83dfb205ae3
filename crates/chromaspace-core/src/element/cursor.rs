//! Cursor markers and the fixed-size pool that holds them.

use glam::Vec3;

use crate::color::Color;

/// Sphere radius for a cursor of size 1, in normalized scene units.
pub const CURSOR_RADIUS: f32 = 0.1;

/// A cursor requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorSpec {
    pub pos: Vec3,
    pub color: Option<Color>,
    pub opacity: Option<f32>,
    pub size: Option<f32>,
}

impl CursorSpec {
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }

    /// Display color, black when unset.
    pub fn rgb(&self) -> Vec3 {
        self.color.map_or(Vec3::ZERO, |c| c.to_rgb())
    }

    pub fn size_or_default(&self) -> f32 {
        self.size.unwrap_or(1.0)
    }
}

/// A cursor ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorInstance {
    pub position: Vec3,
    pub scale: Vec3,
    pub rgb: Vec3,
    pub opacity: f32,
}

impl CursorInstance {
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            rgb: Vec3::ZERO,
            opacity: 1.0,
        }
    }
}

/// Holds exactly as many cursors as the last spec list asked for.
#[derive(Debug, Clone)]
pub struct CursorPool {
    cursors: Vec<CursorInstance>,
}

impl CursorPool {
    /// A pool with one default cursor.
    pub fn new(scale: Vec3) -> Self {
        Self {
            cursors: vec![CursorInstance::new(Vec3::ZERO, scale)],
        }
    }

    pub fn instances(&self) -> &[CursorInstance] {
        &self.cursors
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Replace the pool with one instance per spec.
    pub fn sync(&mut self, specs: &[CursorSpec], place: impl FnMut(&CursorSpec) -> CursorInstance) {
        self.cursors.clear();
        self.cursors.extend(specs.iter().map(place));
    }

    /// Move every existing cursor to `position`, keeping its style.
    pub fn follow(&mut self, position: Vec3) {
        for cursor in &mut self.cursors {
            cursor.position = position;
        }
    }

    /// Rescale every existing cursor.
    pub fn rescale(&mut self, scale: Vec3) {
        for cursor in &mut self.cursors {
            cursor.scale = scale;
        }
    }
}

/// Opacity for a cursor `delta` away from the active slice.
///
/// Opaque near the slice, fading toward a floor of 0.1.
pub fn cursor_fade(delta: f32) -> f32 {
    let far = 0.5 - (3.0 * delta).powi(3);
    let near = (1.5 - 40.0 * delta).min(1.0);
    far.max(near).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorSpaceId;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_cursor_fade_bounds() {
        assert!((cursor_fade(0.0) - 1.0).abs() < EPSILON);
        assert!((cursor_fade(0.01) - 1.0).abs() < EPSILON);
        assert!((cursor_fade(1.0) - 0.1).abs() < EPSILON);
        let mut last = f32::INFINITY;
        for i in 0..=100 {
            let fade = cursor_fade(i as f32 / 100.0);
            assert!((0.1..=1.0).contains(&fade), "fade {fade} at {i}");
            assert!(fade <= last + EPSILON, "fade increased at {i}");
            last = fade;
        }
    }

    #[test]
    fn test_pool_resizes_to_spec_count() {
        let scale = Vec3::splat(CURSOR_RADIUS);
        let mut pool = CursorPool::new(scale);
        assert_eq!(pool.len(), 1);

        let red = Color::new(ColorSpaceId::Srgb, Vec3::X);
        let specs = [
            CursorSpec::at(Vec3::splat(0.1)),
            CursorSpec {
                color: Some(red),
                opacity: Some(0.5),
                ..CursorSpec::at(Vec3::splat(0.2))
            },
            CursorSpec::at(Vec3::splat(0.3)),
        ];
        pool.sync(&specs, |s| CursorInstance {
            rgb: s.rgb(),
            opacity: s.opacity.unwrap_or(1.0),
            ..CursorInstance::new(s.pos, scale)
        });
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.instances()[1].rgb, Vec3::X);
        assert_eq!(pool.instances()[0].rgb, Vec3::ZERO);

        pool.sync(&specs[..1], |s| CursorInstance::new(s.pos, scale));
        assert_eq!(pool.len(), 1);

        pool.follow(Vec3::ONE);
        assert!(pool.instances().iter().all(|c| c.position == Vec3::ONE));
    }
}
