//! Render pass configuration and per-frame command encoding.

use std::sync::Arc;

use pano_image::srgb_to_linear;

/// Dark blue backdrop shown around the sphere and while nothing is loaded.
///
/// sRGB `(0, 0, 150)` in linear light; the surface re-encodes it.
pub const PANORAMA_BLUE: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.304_987_314_069_886_3,
    a: 1.0,
};

/// Convert an sRGB config triple to an opaque linear clear color.
pub fn clear_color_from_srgb(rgb: [f64; 3]) -> wgpu::Color {
    let linear = |c: f64| srgb_to_linear(c as f32) as f64;
    wgpu::Color {
        r: linear(rgb[0]),
        g: linear(rgb[1]),
        b: linear(rgb[2]),
        a: 1.0,
    }
}

/// Builder for a single-color-target render pass with optional depth.
#[derive(Debug)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    depth: Option<(wgpu::TextureView, f32)>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    pub fn new() -> Self {
        Self {
            clear_color: PANORAMA_BLUE,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Clear `view` to `clear_value` at the start of the pass.
    pub fn depth(mut self, view: wgpu::TextureView, clear_value: f32) -> Self {
        self.depth = Some((view, clear_value));
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &'encoder wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth
                .as_ref()
                .map(|(view, clear_value)| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(*clear_value),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// One frame's command encoder plus the surface texture it draws into.
///
/// Call [`submit`](FrameEncoder::submit) to finish; dropping an unsubmitted
/// encoder submits and presents anyway.
pub struct FrameEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    queue: Arc<wgpu::Queue>,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: Some(surface_texture),
            surface_view,
        }
    }

    /// Begin a pass targeting the surface. `None` once the frame was submitted.
    pub fn begin_render_pass<'a>(
        &'a mut self,
        builder: &'a RenderPassBuilder,
    ) -> Option<wgpu::RenderPass<'a>> {
        let encoder = self.encoder.as_mut()?;
        Some(builder.begin(encoder, &self.surface_view))
    }

    pub fn submit(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        {
            self.queue.submit([encoder.finish()]);
            surface_texture.present();
        }
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!("FrameEncoder dropped without submit(), submitting now");
            self.finish();
        }
    }
}
