use crate::device::Gpu;

/// Device, queue and surface format for the frame being encoded.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Format every pipeline must target.
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    pub fn from_gpu(gpu: &'a Gpu<'_>) -> Self {
        Self {
            device: gpu.device(),
            queue: gpu.queue(),
            surface_format: gpu.surface_format(),
        }
    }
}

/// The acquired back buffer and the encoder recording into it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}
