//! Chromaspace GPU: the wgpu implementation of the render and pick seams.
//!
//! `chromaspace-core` describes each frame; this crate turns those frames
//! into draw calls. [`GpuSceneRenderer`] draws the visible scene for both
//! widgets and [`GpuPicker`] renders the pick scene and reads back the
//! texel under the pointer.

pub mod buffers;
pub mod context;
pub mod error;
pub mod pick;
pub mod pipeline;
pub mod renderer;
pub mod shader;

use chromaspace_core::geometry::mesh::{self, Mesh};

pub use context::GpuContext;
pub use error::GpuError;
pub use pick::GpuPicker;
pub use renderer::GpuSceneRenderer;
pub use shader::WgslComposer;

/// Visible scene color target.
pub const VISIBLE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Pick scene color target. Full float so coordinates survive readback.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The Space volume, fine along X so the cylinder's turn looks round.
pub(crate) fn volume_mesh() -> Mesh {
    mesh::unit_cube(64, 8, 8)
}

pub(crate) fn strip_mesh() -> Mesh {
    mesh::plane(32, 32)
}

pub(crate) fn cursor_mesh() -> Mesh {
    mesh::sphere(16, 32)
}

/// Device features the pipelines rely on.
///
/// Rgba32Float is only rendered to and copied out, never filtered, so core
/// WebGPU is enough.
pub fn required_features() -> wgpu::Features {
    wgpu::Features::empty()
}
