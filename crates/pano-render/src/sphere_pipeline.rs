//! Pipeline that draws the textured sphere from the inside.

use std::num::NonZeroU64;

use crate::buffer::{MeshBuffer, sphere_vertex_layout};
use crate::camera::CameraUniform;
use crate::depth::DepthBuffer;

/// Render pipeline plus the camera layout it expects at group 0.
/// Group 1 is the panorama texture layout passed to [`SpherePipeline::new`].
pub struct SpherePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
}

impl SpherePipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sphere-shader"),
            source: wgpu::ShaderSource::Wgsl(SPHERE_SHADER_SOURCE.into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("sphere-camera-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<CameraUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere-pipeline-layout"),
            bind_group_layouts: &[&camera_bind_group_layout, texture_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sphere-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[sphere_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The camera sits inside the sphere.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthBuffer::stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            camera_bind_group_layout,
        }
    }
}

pub fn draw_sphere<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &'a SpherePipeline,
    camera_bind_group: &'a wgpu::BindGroup,
    texture_bind_group: &'a wgpu::BindGroup,
    mesh: &'a MeshBuffer,
) {
    render_pass.set_pipeline(&pipeline.pipeline);
    render_pass.set_bind_group(0, camera_bind_group, &[]);
    render_pass.set_bind_group(1, texture_bind_group, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

pub const SPHERE_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var t_panorama: texture_2d<f32>;
@group(1) @binding(1)
var s_panorama: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(t_panorama, s_panorama, in.uv);
    return vec4<f32>(texel.rgb * in.color.rgb, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::texture::PanoramaTextures;

    #[test]
    fn test_shader_declares_entry_points_and_locations() {
        assert!(SPHERE_SHADER_SOURCE.contains("fn vs_main"));
        assert!(SPHERE_SHADER_SOURCE.contains("fn fs_main"));
        for loc in ["@location(0) position", "@location(1) color", "@location(2) uv"] {
            assert!(SPHERE_SHADER_SOURCE.contains(loc), "missing {loc}");
        }
    }

    #[test]
    fn test_pipeline_creation_succeeds() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let textures = PanoramaTextures::new(&device);
        let pipeline = SpherePipeline::new(
            &device,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            textures.bind_group_layout(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test-camera"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let _bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("test"),
            layout: &pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
    }
}
