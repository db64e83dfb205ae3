use glam::Vec3;
use palette::{FromColor, Hsv, LinSrgb, Okhsl, Okhsv, Oklab, Srgb};

use super::{Embedding, ShaderFragment};
use crate::geometry::axis::Axis;
use crate::geometry::vec::wrap_unit;

/// Coordinates are sRGB channels already.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrgbShading;

impl Embedding for SrgbShading {
    fn name(&self) -> &'static str {
        "srgb"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Srgb
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        v
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        v
    }
}

/// Coordinates are `(hue, value, saturation)`, all normalized.
///
/// Value sits on Y so the cylinder layout stacks brightness vertically and
/// puts saturation on the radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct HsvShading;

impl Embedding for HsvShading {
    fn name(&self) -> &'static str {
        "hsv"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Hsv
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        let hsv = Hsv::new(wrap_unit(v.x) * 360.0, v.z, v.y);
        let rgb = Srgb::from_color(hsv);
        Vec3::new(rgb.red, rgb.green, rgb.blue)
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        let hsv = Hsv::from_color(Srgb::new(v.x, v.y, v.z));
        let hue = wrap_unit(hsv.hue.into_positive_degrees() / 360.0);
        Vec3::new(hue, hsv.value, hsv.saturation)
    }

    fn angular_axis(&self) -> Option<Axis> {
        Some(Axis::X)
    }
}

fn oklab_to_rgb(lab: Oklab) -> Vec3 {
    let linear: LinSrgb = LinSrgb::from_color(lab);
    let rgb: Srgb = Srgb::from_linear(linear);
    Vec3::new(rgb.red, rgb.green, rgb.blue)
}

fn rgb_to_oklab(v: Vec3) -> Oklab {
    let linear: LinSrgb = Srgb::new(v.x, v.y, v.z).into_linear();
    Oklab::from_color(linear)
}

/// Okhsv with the same `(hue, value, saturation)` order as [`HsvShading`].
///
/// Equal steps in value and saturation look equal, unlike plain HSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkhsvShading;

impl Embedding for OkhsvShading {
    fn name(&self) -> &'static str {
        "okhsv"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Okhsv
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        if v.y <= 0.0 {
            return Vec3::ZERO;
        }
        let hsv = Okhsv::new(wrap_unit(v.x) * 360.0, v.z, v.y);
        oklab_to_rgb(Oklab::from_color(hsv))
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        let hsv = Okhsv::from_color(rgb_to_oklab(v));
        let hue = wrap_unit(hsv.hue.into_positive_degrees() / 360.0);
        Vec3::new(hue, hsv.value, hsv.saturation)
    }

    fn angular_axis(&self) -> Option<Axis> {
        Some(Axis::X)
    }
}

/// Okhsl as `(hue, lightness, saturation)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkhslShading;

impl Embedding for OkhslShading {
    fn name(&self) -> &'static str {
        "okhsl"
    }

    fn shader(&self) -> ShaderFragment {
        ShaderFragment::Okhsl
    }

    fn embed(&self, v: Vec3) -> Vec3 {
        // Hue and saturation are meaningless at the poles.
        if v.y <= 0.0 {
            return Vec3::ZERO;
        }
        if v.y >= 1.0 {
            return Vec3::ONE;
        }
        let hsl = Okhsl::new(wrap_unit(v.x) * 360.0, v.z, v.y);
        oklab_to_rgb(Oklab::from_color(hsl))
    }

    fn invert(&self, v: Vec3) -> Vec3 {
        let hsl = Okhsl::from_color(rgb_to_oklab(v));
        let hue = wrap_unit(hsl.hue.into_positive_degrees() / 360.0);
        Vec3::new(hue, hsl.lightness, hsl.saturation)
    }

    fn angular_axis(&self) -> Option<Axis> {
        Some(Axis::X)
    }
}
