//! Per-frame drawing of the panorama sphere.

use pano_image::DecodedImage;
use pano_mesh::SphereMesh;
use wgpu::util::DeviceExt;

use crate::buffer::{MeshBuffer, upload_sphere};
use crate::camera::OrbitCamera;
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::sphere_pipeline::{SpherePipeline, draw_sphere};
use crate::texture::{PanoramaTexture, PanoramaTextures, TextureError};

/// GPU resources for the sphere: mesh, pipeline, camera uniform, depth and
/// the currently bound panorama.
pub struct SphereRenderer {
    pipeline: SpherePipeline,
    textures: PanoramaTextures,
    mesh: MeshBuffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth: DepthBuffer,
    current: PanoramaTexture,
}

impl SphereRenderer {
    pub fn new(ctx: &RenderContext, mesh: &SphereMesh) -> Self {
        let device = &ctx.device;
        let textures = PanoramaTextures::new(device);
        let pipeline =
            SpherePipeline::new(device, ctx.surface_format, textures.bind_group_layout());

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere-camera-uniform"),
            contents: bytemuck::bytes_of(&OrbitCamera::default().to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sphere-camera-bind-group"),
            layout: &pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let depth = DepthBuffer::new(
            device,
            ctx.surface_config.width,
            ctx.surface_config.height,
        );
        let current = textures.placeholder(device, &ctx.queue);

        Self {
            pipeline,
            mesh: upload_sphere(device, mesh),
            textures,
            camera_buffer,
            camera_bind_group,
            depth,
            current,
        }
    }

    /// Replace the bound texture. On error the previous texture stays.
    pub fn set_image(
        &mut self,
        ctx: &RenderContext,
        label: &str,
        image: &DecodedImage,
    ) -> Result<(), TextureError> {
        let texture = self
            .textures
            .create_from_image(&ctx.device, &ctx.queue, label, image)?;
        self.current = texture;
        Ok(())
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Clear, then draw the sphere as seen from `camera`.
    pub fn render(
        &self,
        ctx: &RenderContext,
        camera: &OrbitCamera,
        clear_color: wgpu::Color,
    ) -> Result<(), SurfaceError> {
        ctx.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniform()),
        );

        let surface_texture = ctx.get_current_texture()?;
        let mut frame = FrameEncoder::new(&ctx.device, ctx.queue.clone(), surface_texture);
        let builder = RenderPassBuilder::new()
            .clear_color(clear_color)
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("sphere-pass");

        if let Some(mut pass) = frame.begin_render_pass(&builder) {
            draw_sphere(
                &mut pass,
                &self.pipeline,
                &self.camera_bind_group,
                &self.current.bind_group,
                &self.mesh,
            );
        }
        frame.submit();
        Ok(())
    }
}
