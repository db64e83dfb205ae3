//! Visible scene rendering for both widgets into an offscreen target.
//!
//! Hosts composite [`GpuSceneRenderer::target_view`] into their own
//! surface, or read it back with [`GpuSceneRenderer::read_target`].

use std::sync::Arc;

use chromaspace_core::ShaderFragment;
use chromaspace_core::element::{AxisFrame, CursorInstance, FrameRenderer, SpaceFrame};
use chromaspace_core::embedding::Embedding;
use glam::{Mat4, Vec4};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::GpuContext;
use crate::buffers::{GpuMesh, RenderTarget, SceneUniforms, UniformRing};
use crate::error::GpuError;
use crate::pipeline::{PassKind, PipelineCache};

const CURSOR_FRAGMENTS: [ShaderFragment; 2] = [ShaderFragment::Cartesian, ShaderFragment::Flat];

/// Which mesh a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Volume,
    Strip,
}

pub struct GpuSceneRenderer {
    context: GpuContext,
    pipelines: PipelineCache,
    uniforms: UniformRing,
    volume: GpuMesh,
    strip: GpuMesh,
    cursor: GpuMesh,
    target: Option<RenderTarget>,
    frames: u64,
}

impl GpuSceneRenderer {
    pub fn new(context: GpuContext) -> Self {
        let device = &context.device;
        let pipelines = PipelineCache::new(device);
        let uniforms = UniformRing::new(
            device,
            pipelines.uniform_layout(),
            4,
            "chromaspace_scene_uniforms",
        );
        let volume = GpuMesh::upload(device, &crate::volume_mesh(), "chromaspace_volume");
        let strip = GpuMesh::upload(device, &crate::strip_mesh(), "chromaspace_strip");
        let cursor = GpuMesh::upload(device, &crate::cursor_mesh(), "chromaspace_cursor");
        Self {
            context,
            pipelines,
            uniforms,
            volume,
            strip,
            cursor,
            target: None,
            frames: 0,
        }
    }

    /// The last drawn frame, if anything has been drawn yet.
    pub fn target_view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|t| &t.color_view)
    }

    /// Frames drawn so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Read the visible target back as RGBA8 rows, top row first.
    pub fn read_target(&self) -> Result<TargetPixels, GpuError> {
        let Some(target) = self.target.as_ref() else {
            return Err(GpuError::Readback("nothing has been drawn".into()));
        };
        let device = &self.context.device;
        let unpadded = target.width * 4;
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chromaspace_scene_staging"),
            size: padded as u64 * target.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("chromaspace_scene_readback_encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let mapped = Arc::new(Mutex::new(None));
        let callback_slot = mapped.clone();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            *callback_slot.lock() = Some(r);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::ContextLost(e.to_string()))?;
        match mapped.lock().take() {
            Some(Ok(())) => {}
            Some(Err(e)) => return Err(GpuError::Readback(e.to_string())),
            None => return Err(GpuError::Readback("map callback never fired".into())),
        }

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((target.width * target.height) as usize);
        for row in data.chunks(padded as usize) {
            let row: &[[u8; 4]] = bytemuck::cast_slice(&row[..unpadded as usize]);
            pixels.extend_from_slice(row);
        }
        drop(data);
        staging.unmap();
        Ok(TargetPixels {
            width: target.width,
            height: target.height,
            pixels,
        })
    }

    fn ensure_target(&mut self, width: u32, height: u32) {
        if self.target.as_ref().is_some_and(|t| t.matches(width, height)) {
            return;
        }
        debug!(width, height, "allocating scene target");
        self.target = Some(RenderTarget::new(
            &self.context.device,
            crate::VISIBLE_FORMAT,
            width,
            height,
            "chromaspace_scene_target",
        ));
    }

    fn cursor_uniforms(view_proj: Mat4, cursors: &[CursorInstance]) -> Vec<SceneUniforms> {
        cursors
            .iter()
            .map(|c| {
                let model = Mat4::from_translation(c.position) * Mat4::from_scale(c.scale);
                SceneUniforms::new(view_proj, model, Mat4::IDENTITY)
                    .with_tint(Vec4::new(c.rgb.x, c.rgb.y, c.rgb.z, c.opacity))
                    .raw_placement()
            })
            .collect()
    }

    /// Draw `body` with `fragments` and the cursors over it, in one pass.
    fn draw_scene(
        &mut self,
        size: (u32, u32),
        body: Body,
        fragments: &[ShaderFragment],
        slots: &[SceneUniforms],
    ) {
        self.ensure_target(size.0, size.1);
        let device = self.context.device.clone();
        self.pipelines.prepare(&device, fragments, PassKind::Visible);
        self.pipelines.prepare(&device, &CURSOR_FRAGMENTS, PassKind::Overlay);
        self.uniforms
            .write(&device, &self.context.queue, self.pipelines.uniform_layout(), slots);

        let (Some(target), Some(scene), Some(overlay)) = (
            self.target.as_ref(),
            self.pipelines.get(fragments, PassKind::Visible),
            self.pipelines.get(&CURSOR_FRAGMENTS, PassKind::Overlay),
        ) else {
            warn!("scene resources missing, skipping frame");
            return;
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("chromaspace_scene_encoder"),
        });
        {
            let mut pass = target.begin_pass(&mut encoder, "chromaspace_scene_pass");
            pass.set_pipeline(scene);
            pass.set_bind_group(0, self.uniforms.bind_group(), &[self.uniforms.offset(0)]);
            match body {
                Body::Volume => self.volume.draw(&mut pass),
                Body::Strip => self.strip.draw(&mut pass),
            }

            pass.set_pipeline(overlay);
            for slot in 1..slots.len() {
                pass.set_bind_group(0, self.uniforms.bind_group(), &[self.uniforms.offset(slot)]);
                self.cursor.draw(&mut pass);
            }
        }
        self.context.queue.submit(Some(encoder.finish()));
        self.frames += 1;
    }
}

impl FrameRenderer<SpaceFrame> for GpuSceneRenderer {
    fn draw(&mut self, frame: &SpaceFrame) {
        let mut fragments = frame.layout.shader_chain();
        fragments.push(frame.shading.shader());
        let mut slots = vec![SceneUniforms::new(
            frame.view_proj,
            Mat4::IDENTITY,
            frame.slice.matrix(),
        )];
        slots.extend(Self::cursor_uniforms(frame.view_proj, &frame.cursors));
        self.draw_scene((frame.width, frame.height), Body::Volume, &fragments, &slots);
    }

    fn embedding_changed(&mut self, _layout: &dyn Embedding, _shading: &dyn Embedding) {
        self.pipelines.clear();
    }
}

impl FrameRenderer<AxisFrame> for GpuSceneRenderer {
    fn draw(&mut self, frame: &AxisFrame) {
        let fragments = [ShaderFragment::Cartesian, frame.shading.shader()];
        // The strip plane fills the viewport; only its color comes from the
        // embed matrix.
        let strip = SceneUniforms::new(frame.view_proj, Mat4::IDENTITY, frame.embed_matrix)
            .raw_placement();
        let mut slots = vec![strip];
        slots.extend(Self::cursor_uniforms(frame.view_proj, &frame.cursors));
        self.draw_scene((frame.width, frame.height), Body::Strip, &fragments, &slots);
    }

    fn embedding_changed(&mut self, _layout: &dyn Embedding, _shading: &dyn Embedding) {
        self.pipelines.clear();
    }
}

/// RGBA8 pixels read back from the visible target.
#[derive(Debug, Clone)]
pub struct TargetPixels {
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first.
    pub pixels: Vec<[u8; 4]>,
}

impl TargetPixels {
    /// Pixel at canvas position `(x, y)`, bottom-left origin.
    pub fn at_canvas(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = self.height - 1 - y;
        self.pixels.get((row * self.width + x) as usize).copied()
    }
}
