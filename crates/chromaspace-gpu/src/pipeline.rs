//! Render pipelines for the scene passes, built on demand per fragment list.

use std::collections::HashMap;

use chromaspace_core::ShaderFragment;
use chromaspace_core::embedding::ShaderBuilder;
use tracing::debug;

use crate::buffers::vertex_layout;
use crate::shader::{WgslComposer, program_label};

/// Which pass a pipeline draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Opaque volume or strip into the visible target.
    Visible,
    /// Opaque volume into the float pick target.
    Pick,
    /// Blended cursors drawn over the visible target.
    Overlay,
}

impl PassKind {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Visible | Self::Overlay => crate::VISIBLE_FORMAT,
            Self::Pick => crate::PICK_FORMAT,
        }
    }

    fn blend(self) -> Option<wgpu::BlendState> {
        match self {
            Self::Overlay => Some(wgpu::BlendState::ALPHA_BLENDING),
            Self::Visible | Self::Pick => None,
        }
    }

    fn depth_compare(self) -> wgpu::CompareFunction {
        match self {
            Self::Overlay => wgpu::CompareFunction::Always,
            Self::Visible | Self::Pick => wgpu::CompareFunction::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    fragments: Vec<ShaderFragment>,
    pass: PassKind,
}

/// Pipelines keyed by fragment list and pass, sharing one uniform layout.
pub struct PipelineCache {
    composer: WgslComposer,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = crate::buffers::uniform_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("chromaspace_scene_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        Self {
            composer: WgslComposer::default(),
            uniform_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
        }
    }

    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    /// Build any missing pipelines for `fragments` in `pass`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        fragments: &[ShaderFragment],
        pass: PassKind,
    ) {
        let key = PipelineKey {
            fragments: fragments.to_vec(),
            pass,
        };
        if self.pipelines.contains_key(&key) {
            return;
        }
        let pipeline = self.build(device, &key);
        self.pipelines.insert(key, pipeline);
    }

    /// A pipeline previously built by [`prepare`](Self::prepare).
    pub fn get(
        &self,
        fragments: &[ShaderFragment],
        pass: PassKind,
    ) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&PipelineKey {
            fragments: fragments.to_vec(),
            pass,
        })
    }

    /// Drop every pipeline; they are rebuilt on next use.
    pub fn clear(&mut self) {
        if !self.pipelines.is_empty() {
            debug!(count = self.pipelines.len(), "dropping scene pipelines");
        }
        self.pipelines.clear();
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    fn build(&self, device: &wgpu::Device, key: &PipelineKey) -> wgpu::RenderPipeline {
        let label = program_label(&key.fragments);
        debug!(%label, pass = ?key.pass, "building scene pipeline");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(self.composer.build(&key.fragments).into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.pass.format(),
                    blend: key.pass.blend(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Slices expose the volume's inside and mesh winding is mixed.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: crate::DEPTH_FORMAT,
                depth_write_enabled: key.pass != PassKind::Overlay,
                depth_compare: key.pass.depth_compare(),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_targets() {
        assert_eq!(PassKind::Pick.format(), crate::PICK_FORMAT);
        assert!(PassKind::Pick.blend().is_none());
        assert_eq!(PassKind::Overlay.format(), crate::VISIBLE_FORMAT);
        assert!(PassKind::Overlay.blend().is_some());
        assert_eq!(PassKind::Overlay.depth_compare(), wgpu::CompareFunction::Always);
        assert_eq!(PassKind::Visible.depth_compare(), wgpu::CompareFunction::Less);
    }
}
