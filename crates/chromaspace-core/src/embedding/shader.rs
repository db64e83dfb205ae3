use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChromaError;

/// Named pieces a shader program is assembled from.
///
/// Layout fragments position vertices and apply in sequence, shading
/// fragments color them, and `Pick`/`Flat` replace shading for the pick
/// scene and cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderFragment {
    Cartesian,
    Cylindrical,
    Oklab,
    SwapXY,
    SwapXZ,
    SwapYZ,
    Srgb,
    Hsv,
    Okhsv,
    Okhsl,
    Pick,
    Flat,
}

impl ShaderFragment {
    pub const ALL: [ShaderFragment; 12] = [
        Self::Cartesian,
        Self::Cylindrical,
        Self::Oklab,
        Self::SwapXY,
        Self::SwapXZ,
        Self::SwapYZ,
        Self::Srgb,
        Self::Hsv,
        Self::Okhsv,
        Self::Okhsl,
        Self::Pick,
        Self::Flat,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Cartesian => "cartesian",
            Self::Cylindrical => "cylindrical",
            Self::Oklab => "oklab",
            Self::SwapXY => "swapxy",
            Self::SwapXZ => "swapxz",
            Self::SwapYZ => "swapyz",
            Self::Srgb => "srgb",
            Self::Hsv => "hsv",
            Self::Okhsv => "okhsv",
            Self::Okhsl => "okhsl",
            Self::Pick => "pick",
            Self::Flat => "flat",
        }
    }

    /// True for fragments that position vertices.
    pub const fn is_layout(self) -> bool {
        matches!(
            self,
            Self::Cartesian
                | Self::Cylindrical
                | Self::Oklab
                | Self::SwapXY
                | Self::SwapXZ
                | Self::SwapYZ
        )
    }
}

impl FromStr for ShaderFragment {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == s.trim())
            .ok_or_else(|| ChromaError::UnknownShader(s.to_string()))
    }
}

impl fmt::Display for ShaderFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Turns a list of fragments into a program. The output is opaque here.
pub trait ShaderBuilder {
    type Output;

    fn build(&self, fragments: &[ShaderFragment]) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_ids_round_trip() {
        for fragment in ShaderFragment::ALL {
            assert_eq!(fragment.id().parse::<ShaderFragment>().ok(), Some(fragment));
        }
        let err = "phong".parse::<ShaderFragment>().unwrap_err();
        assert!(ShaderFragment::SwapYZ.is_layout());
        assert!(!ShaderFragment::Okhsl.is_layout());
        assert!(matches!(err, ChromaError::UnknownShader(ref s) if s == "phong"));
    }
}
