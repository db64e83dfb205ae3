//! Color model: a normalized coordinate tagged with the space it lives in.
//!
//! Coordinates are always in [0, 1] per channel (the angular channel wraps).
//! For HSV and Okhsv the order is `(hue, value, saturation)` so value runs
//! along Y; Okhsl is `(hue, lightness, saturation)`.

mod state;

pub use state::{ChangeQueue, ColorChange, ColorState, ColorUpdate};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use glam::Vec3;
use palette::{FromColor, LinSrgb, Oklab, Srgb};
use serde::{Deserialize, Serialize};

use crate::embedding::{Embedding, HsvShading, OkhslShading, OkhsvShading, SrgbShading};
use crate::error::ChromaError;
use crate::geometry::vec::clamp_vec3;

/// Threshold under which `is_dark` reports true, on Oklab lightness.
const DARK_LIGHTNESS: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceId {
    #[default]
    Srgb,
    Hsv,
    Okhsv,
    Okhsl,
}

impl ColorSpaceId {
    pub const ALL: [ColorSpaceId; 4] = [Self::Srgb, Self::Hsv, Self::Okhsv, Self::Okhsl];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Srgb => "srgb",
            Self::Hsv => "hsv",
            Self::Okhsv => "okhsv",
            Self::Okhsl => "okhsl",
        }
    }

    fn embedding(self) -> &'static dyn Embedding {
        match self {
            Self::Srgb => &SrgbShading,
            Self::Hsv => &HsvShading,
            Self::Okhsv => &OkhsvShading,
            Self::Okhsl => &OkhslShading,
        }
    }

    pub fn shading(self) -> Arc<dyn Embedding> {
        match self {
            Self::Srgb => Arc::new(SrgbShading),
            Self::Hsv => Arc::new(HsvShading),
            Self::Okhsv => Arc::new(OkhsvShading),
            Self::Okhsl => Arc::new(OkhslShading),
        }
    }

    /// Normalized coordinate to sRGB channels.
    pub fn to_rgb(self, v: Vec3) -> Vec3 {
        self.embedding().embed(v)
    }

    /// sRGB channels to a normalized coordinate in this space.
    pub fn from_rgb(self, rgb: Vec3) -> Vec3 {
        self.embedding().invert(rgb)
    }
}

impl FromStr for ColorSpaceId {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srgb" | "rgb" => Ok(Self::Srgb),
            "hsv" => Ok(Self::Hsv),
            "okhsv" => Ok(Self::Okhsv),
            "okhsl" => Ok(Self::Okhsl),
            _ => Err(ChromaError::UnknownColorSpace(s.to_string())),
        }
    }
}

impl fmt::Display for ColorSpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub space: ColorSpaceId,
    input: Vec3,
}

impl Color {
    pub fn new(space: ColorSpaceId, input: Vec3) -> Self {
        Self { space, input }
    }

    /// The normalized coordinate.
    pub fn get_norm(&self) -> Vec3 {
        self.input
    }

    pub fn set_norm(&mut self, value: Vec3) {
        self.input = value;
    }

    /// A new color offset by `delta` in normalized space.
    pub fn add_norm(&self, delta: Vec3) -> Color {
        Color::new(self.space, self.input + delta)
    }

    /// Same color expressed in another space.
    pub fn convert(&self, space: ColorSpaceId) -> Color {
        let rgb = self.to_rgb();
        Color::new(space, space.from_rgb(rgb))
    }

    /// sRGB channels, clamped to [0, 1].
    pub fn to_rgb(&self) -> Vec3 {
        let wrapped = self.space.shading().wrap(self.input);
        clamp_vec3(self.space.to_rgb(wrapped))
    }

    pub fn to_srgb(&self) -> Srgb {
        let rgb = self.to_rgb();
        Srgb::new(rgb.x, rgb.y, rgb.z)
    }

    /// `#rrggbb`.
    pub fn to_css(&self) -> String {
        let rgb: Srgb<u8> = self.to_srgb().into_format();
        format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
    }

    /// `space(a, b, c)` with the normalized channels rounded to 2 decimals.
    pub fn functional(&self) -> String {
        let round = |x: f32| (x * 100.0).round() / 100.0;
        let v = self.input;
        format!(
            "{}({}, {}, {})",
            self.space,
            round(v.x),
            round(v.y),
            round(v.z)
        )
    }

    fn oklab(&self) -> Oklab {
        let linear: LinSrgb = self.to_srgb().into_linear();
        Oklab::from_color(linear)
    }

    pub fn is_dark(&self) -> bool {
        self.oklab().l < DARK_LIGHTNESS
    }

    /// Perceptual closeness, measured in Oklab.
    pub fn near(&self, other: &Color, eps: f32) -> bool {
        let (a, b) = (self.oklab(), other.oklab());
        let d = Vec3::new(a.l - b.l, a.a - b.a, a.b - b.b);
        d.length() < eps
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(ColorSpaceId::Srgb, Vec3::ZERO)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.functional())
    }
}

impl FromStr for Color {
    type Err = ChromaError;

    /// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)` with 0-255 channels, and
    /// `srgb(..)`, `hsv(..)`, `okhsv(..)` or `okhsl(..)` with normalized
    /// channels.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        if s.starts_with('#') {
            let rgb: Srgb<u8> = s
                .parse()
                .map_err(|_| ChromaError::parse_color(input, "malformed hex color"))?;
            let rgb: Srgb = rgb.into_format();
            return Ok(Color::new(
                ColorSpaceId::Srgb,
                Vec3::new(rgb.red, rgb.green, rgb.blue),
            ));
        }

        let (name, rest) = s
            .split_once('(')
            .ok_or_else(|| ChromaError::parse_color(input, "expected #hex or name(a, b, c)"))?;
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| ChromaError::parse_color(input, "missing closing parenthesis"))?;
        let channels = parse_channels(input, args)?;

        match name.trim().to_ascii_lowercase().as_str() {
            "rgb" => {
                if channels.iter().any(|c| !(0.0..=255.0).contains(c)) {
                    return Err(ChromaError::parse_color(input, "rgb channel out of 0..=255"));
                }
                Ok(Color::new(
                    ColorSpaceId::Srgb,
                    Vec3::from_array(channels) / 255.0,
                ))
            }
            name => match name.parse::<ColorSpaceId>() {
                Ok(space) => Ok(Color::new(space, Vec3::from_array(channels))),
                Err(_) => Err(ChromaError::parse_color(input, "unknown color function")),
            },
        }
    }
}

fn parse_channels(input: &str, args: &str) -> Result<[f32; 3], ChromaError> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [a, b, c] = parts.as_slice() else {
        return Err(ChromaError::parse_color(input, "expected three channels"));
    };
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip([a, b, c]) {
        let value: f32 = part
            .parse()
            .map_err(|_| ChromaError::parse_color(input, "channel is not a number"))?;
        if !value.is_finite() {
            return Err(ChromaError::parse_color(input, "channel is not finite"));
        }
        *slot = value;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_parse_hex_and_functional() {
        let teal: Color = "#008080".parse().unwrap();
        assert_eq!(teal.space, ColorSpaceId::Srgb);
        let expected = Vec3::new(0.0, 128.0 / 255.0, 128.0 / 255.0);
        assert!((teal.get_norm() - expected).length() < EPSILON);
        assert_eq!(teal.to_css(), "#008080");

        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short.to_css(), "#ffffff");

        let rgb: Color = "rgb(255, 0, 51)".parse().unwrap();
        assert_eq!(rgb.to_css(), "#ff0033");

        let hsv: Color = "hsv(0.5, 1, 1)".parse().unwrap();
        assert_eq!(hsv.space, ColorSpaceId::Hsv);
        assert_eq!(hsv.to_css(), "#00ffff");
    }

    #[test]
    fn test_ok_spaces_parse_and_convert() {
        let grey: Color = "okhsl(0.25, 0.5, 0)".parse().unwrap();
        assert_eq!(grey.space, ColorSpaceId::Okhsl);
        let rgb = grey.to_rgb();
        assert!((rgb.x - rgb.y).abs() < 1e-3 && (rgb.y - rgb.z).abs() < 1e-3, "{rgb:?}");

        let brick = Color::new(ColorSpaceId::Srgb, Vec3::new(0.8, 0.2, 0.1));
        for space in ColorSpaceId::ALL {
            let there = brick.convert(space);
            assert_eq!(there.space, space);
            let back = there.convert(ColorSpaceId::Srgb);
            let err = (back.get_norm() - brick.get_norm()).length();
            assert!(err < 1e-3, "{space}: {back:?}");
            assert_eq!(space.as_str().parse::<ColorSpaceId>().ok(), Some(space));
        }
    }

    #[test]
    fn test_malformed_strings_are_rejected() {
        let malformed = [
            "",
            "#12",
            "#gggggg",
            "rgb(1, 2)",
            "rgb(300, 0, 0)",
            "lab(1, 2, 3)",
            "hsv(0.1, x, 1)",
            "srgb(0, 0, 0",
        ];
        for bad in malformed {
            let err = bad.parse::<Color>().unwrap_err();
            match err {
                ChromaError::ParseColor { input, .. } => assert_eq!(input, bad),
                other => panic!("{bad:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_functional_rounds_to_two_decimals() {
        let c = Color::new(ColorSpaceId::Hsv, Vec3::new(0.123, 0.5, 1.0));
        assert_eq!(c.functional(), "hsv(0.12, 0.5, 1)");
        let parsed: Color = c.functional().parse().unwrap();
        assert!((parsed.get_norm() - Vec3::new(0.12, 0.5, 1.0)).length() < EPSILON);
    }

    #[test]
    fn test_norm_accessors_do_not_alias() {
        let mut c = Color::new(ColorSpaceId::Srgb, Vec3::splat(0.25));
        let mut copy = c.get_norm();
        copy.x = 1.0;
        assert_eq!(c.get_norm().x, 0.25);

        let moved = c.add_norm(Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(moved.get_norm().x, 0.75);
        assert_eq!(c.get_norm().x, 0.25);

        c.set_norm(Vec3::ONE);
        assert_eq!(c.get_norm(), Vec3::ONE);
    }

    #[test]
    fn test_is_dark_and_near() {
        let black = Color::new(ColorSpaceId::Srgb, Vec3::ZERO);
        let white = Color::new(ColorSpaceId::Srgb, Vec3::ONE);
        assert!(black.is_dark());
        assert!(!white.is_dark());

        let white_hsv = Color::new(ColorSpaceId::Hsv, Vec3::new(0.3, 1.0, 0.0));
        assert!(white.near(&white_hsv, 1e-4));
        assert!(!white.near(&black, 1e-4));
    }

    #[test]
    fn test_convert_between_spaces() {
        let red = Color::new(ColorSpaceId::Srgb, Vec3::X);
        let hsv = red.convert(ColorSpaceId::Hsv);
        assert!((hsv.get_norm() - Vec3::new(0.0, 1.0, 1.0)).length() < EPSILON, "{hsv:?}");
    }
}
