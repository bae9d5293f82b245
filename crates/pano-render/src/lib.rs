//! wgpu rendering for the panorama sphere: device and surface setup, depth,
//! render passes, orbit camera, panorama textures and the sphere pipeline.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod renderer;
pub mod sphere_pipeline;
pub mod texture;

pub use buffer::{IndexData, MeshBuffer, sphere_vertex_layout, upload_sphere};
pub use camera::{CameraUniform, OrbitCamera, orbit_position};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, PANORAMA_BLUE, RenderPassBuilder, clear_color_from_srgb};
pub use renderer::SphereRenderer;
pub use sphere_pipeline::{SPHERE_SHADER_SOURCE, SpherePipeline, draw_sphere};
pub use texture::{PANORAMA_FORMAT, PanoramaTexture, PanoramaTextures, TextureError};
