//! Device and queue bootstrap.

use std::sync::Arc;

use tracing::info;

use crate::error::GpuError;

/// A device/queue pair shared between the renderer and the picker.
#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Request an adapter and device with the features this crate needs.
    pub async fn create() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await?;
        let adapter_info = adapter.get_info();
        info!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            "GPU adapter selected"
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("chromaspace_device"),
                required_features: crate::required_features(),
                required_limits: adapter.limits(),
                ..Default::default()
            })
            .await?;

        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    /// [`create`](Self::create), blocking the current thread.
    pub fn create_blocking() -> Result<Self, GpuError> {
        pollster::block_on(Self::create())
    }
}
