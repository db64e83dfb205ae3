//! Chromaspace Core: the domain layer for the 3D color picker.
//!
//! This crate contains the spring and camera animation, the embeddings
//! between normalized color coordinates and rendered space, the color
//! model, and the Space/Axis widgets. No GPU or framework dependencies:
//! rendering and picking are reached through the [`element::FrameRenderer`]
//! and [`element::PickPipeline`] traits that `chromaspace-gpu` implements.

pub mod color;
pub mod config;
pub mod element;
pub mod embedding;
pub mod error;
pub mod geometry;
pub mod motion;

// Re-exports for convenience.
pub use color::{ChangeQueue, Color, ColorChange, ColorSpaceId, ColorState, ColorUpdate};
pub use config::PickerConfig;
pub use element::axis::AxisWidget;
pub use element::hub::ColorHub;
pub use element::space::{Slicing, SpaceWidget};
pub use element::{ColorElement, FrameRenderer, PickPipeline};
pub use embedding::{Embedding, ShaderBuilder, ShaderFragment, SpaceLayout};
pub use error::{ChromaError, Result};
pub use geometry::axis::Axis;
pub use motion::camera::{CameraController, CameraPose, Detent};
pub use motion::spring::{Spring, SpringConfig};
