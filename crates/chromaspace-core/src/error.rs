use thiserror::Error;

/// Errors raised while constructing or configuring picker components.
///
/// Per-event failures (pick misses, a lost rendering context) are not
/// represented here: they are absorbed by the widgets and mapped to the
/// saved color.
#[derive(Debug, Error)]
pub enum ChromaError {
    #[error("unknown axis {0:?}, expected X (0), Y (1) or Z (2)")]
    UnknownAxis(String),
    #[error("unknown slicing mode {0:?}, expected \"horizontal\" or \"vertical\"")]
    UnknownSlicing(String),
    #[error("unknown embedding {0:?}")]
    UnknownEmbedding(String),
    #[error("unknown color space {0:?}")]
    UnknownColorSpace(String),
    #[error("unknown shader fragment {0:?}")]
    UnknownShader(String),
    #[error("cannot parse color {input:?}: {reason}")]
    ParseColor { input: String, reason: &'static str },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChromaError>;

impl ChromaError {
    pub(crate) fn parse_color(input: &str, reason: &'static str) -> Self {
        Self::ParseColor {
            input: input.to_string(),
            reason,
        }
    }
}
