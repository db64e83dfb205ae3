//! Geometry: vector helpers, the channel axis table, and pre-embedded meshes.

pub mod axis;
pub mod mesh;
pub mod vec;
