//! Reverse-Z depth buffer.
//!
//! Near maps to 1.0 and far to 0.0, so the buffer is cleared to 0.0 and
//! fragments pass with `GreaterEqual`.

/// Depth attachment sized to the surface.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Far plane in reverse-Z.
    pub const CLEAR_VALUE: f32 = 0.0;

    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Recreate at the new size; no-op when unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width.max(1) && self.height == height.max(1) {
            return;
        }
        *self = Self::new(device, width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth-stencil state for pipelines drawing into this buffer.
    pub fn stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: true,
            depth_compare: Self::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_reverse_z_constants() {
        assert_eq!(DepthBuffer::FORMAT, wgpu::TextureFormat::Depth32Float);
        assert_eq!(DepthBuffer::CLEAR_VALUE, 0.0);
        assert_eq!(
            DepthBuffer::COMPARE_FUNCTION,
            wgpu::CompareFunction::GreaterEqual
        );
    }

    #[test]
    fn test_stencil_state_matches_constants() {
        let state = DepthBuffer::stencil_state();
        assert_eq!(state.format, DepthBuffer::FORMAT);
        assert_eq!(state.depth_compare, DepthBuffer::COMPARE_FUNCTION);
        assert!(state.depth_write_enabled);
    }

    #[test]
    fn test_resize_updates_dimensions() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 800, 600);
        assert_eq!((depth.width(), depth.height()), (800, 600));

        depth.resize(&device, 1920, 1080);
        assert_eq!((depth.width(), depth.height()), (1920, 1080));
        assert!(
            depth
                .texture
                .usage()
                .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        );
    }

    #[test]
    fn test_zero_size_clamped() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let depth = DepthBuffer::new(&device, 0, 0);
        assert_eq!((depth.width(), depth.height()), (1, 1));
    }
}
