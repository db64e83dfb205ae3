//! GPU picking: render the pick scene and read back the texel under the
//! pointer.
//!
//! The pick scene draws the same sliced volume as the visible scene, but
//! its fragments write the pre-embedding coordinate as color and
//! [`PICK_TAG`] as alpha into an Rgba32Float target. Every pick re-renders
//! against the frame it is given and waits for the one-texel copy, so the
//! result always matches that frame.

use std::sync::Arc;

use chromaspace_core::ShaderFragment;
use chromaspace_core::element::frame::PICK_TAG;
use chromaspace_core::element::pick::in_viewport;
use chromaspace_core::element::{PickPipeline, SpaceFrame, decode_pick_texel};
use chromaspace_core::embedding::Embedding;
use glam::{Mat4, Vec3};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::GpuContext;
use crate::buffers::{GpuMesh, RenderTarget, SceneUniforms, UniformRing};
use crate::error::GpuError;
use crate::pipeline::{PassKind, PipelineCache};

/// Copies out of a texture must use rows aligned to this many bytes.
const ROW_ALIGN: u64 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;

/// Bytes in one Rgba32Float texel.
const TEXEL_BYTES: usize = 16;

type MapResult = Arc<Mutex<Option<Result<(), wgpu::BufferAsyncError>>>>;

pub struct GpuPicker {
    context: GpuContext,
    pipelines: PipelineCache,
    uniforms: UniformRing,
    volume: GpuMesh,
    target: Option<RenderTarget>,
    staging: wgpu::Buffer,
    map_result: MapResult,
}

impl GpuPicker {
    pub fn new(context: GpuContext) -> Self {
        let device = &context.device;
        let pipelines = PipelineCache::new(device);
        let uniforms = UniformRing::new(
            device,
            pipelines.uniform_layout(),
            1,
            "chromaspace_pick_uniforms",
        );
        let volume = GpuMesh::upload(device, &crate::volume_mesh(), "chromaspace_pick_volume");
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chromaspace_pick_staging"),
            size: ROW_ALIGN,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            context,
            pipelines,
            uniforms,
            volume,
            target: None,
            staging,
            map_result: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of pick pipelines currently built.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Pick with the failure reason instead of a logged miss.
    ///
    /// `Ok(None)` means the pointer was outside the viewport or nothing
    /// was drawn under it.
    pub fn try_pick(
        &mut self,
        frame: &SpaceFrame,
        x: f32,
        y: f32,
    ) -> Result<Option<Vec3>, GpuError> {
        if !in_viewport(x, y, frame.width, frame.height) {
            return Ok(None);
        }
        let device = self.context.device.clone();
        let queue = self.context.queue.clone();

        if !self.target.as_ref().is_some_and(|t| t.matches(frame.width, frame.height)) {
            self.target = Some(RenderTarget::new(
                &device,
                crate::PICK_FORMAT,
                frame.width,
                frame.height,
                "chromaspace_pick_target",
            ));
        }
        let Some(target) = self.target.as_ref() else {
            return Err(GpuError::Readback("pick target missing".into()));
        };

        let mut fragments = frame.layout.shader_chain();
        fragments.push(ShaderFragment::Pick);
        self.pipelines.prepare(&device, &fragments, PassKind::Pick);
        let Some(pipeline) = self.pipelines.get(&fragments, PassKind::Pick) else {
            return Err(GpuError::Readback("pick pipeline missing".into()));
        };

        let uniforms = SceneUniforms::new(frame.view_proj, Mat4::IDENTITY, frame.slice.matrix())
            .with_pick_tag(PICK_TAG);
        self.uniforms
            .write(&device, &queue, self.pipelines.uniform_layout(), &[uniforms]);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("chromaspace_pick_encoder"),
        });
        {
            let mut pass = target.begin_pass(&mut encoder, "chromaspace_pick_pass");
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, self.uniforms.bind_group(), &[self.uniforms.offset(0)]);
            self.volume.draw(&mut pass);
        }

        // The canvas origin is bottom-left, texture rows run top-down.
        let column = (x as u32).min(target.width - 1);
        let row = target.height - 1 - (y as u32).min(target.height - 1);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: column,
                    y: row,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(ROW_ALIGN as u32),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let texel = self.read_texel(&device)?;
        trace!(x, y, column, row, ?texel, "pick texel");
        Ok(decode_pick_texel(texel).map(|coord| frame.layout.wrap(coord)))
    }

    fn read_texel(&self, device: &wgpu::Device) -> Result<[f32; 4], GpuError> {
        let slice = self.staging.slice(..);
        let result = self.map_result.clone();
        *result.lock() = None;
        slice.map_async(wgpu::MapMode::Read, move |r| {
            *result.lock() = Some(r);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::ContextLost(e.to_string()))?;

        match self.map_result.lock().take() {
            Some(Ok(())) => {}
            Some(Err(e)) => return Err(GpuError::Readback(e.to_string())),
            None => return Err(GpuError::Readback("map callback never fired".into())),
        }

        let data = slice.get_mapped_range();
        let texel: [f32; 4] = bytemuck::pod_read_unaligned(&data[..TEXEL_BYTES]);
        drop(data);
        self.staging.unmap();
        Ok(texel)
    }
}

impl PickPipeline for GpuPicker {
    fn pick(&mut self, frame: &SpaceFrame, x: f32, y: f32) -> Option<Vec3> {
        match self.try_pick(frame, x, y) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("pick failed: {e}");
                None
            }
        }
    }

    fn embedding_changed(&mut self, _layout: &dyn Embedding) {
        self.pipelines.clear();
    }
}
