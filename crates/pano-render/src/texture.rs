//! Panorama textures: `Rgba16Float`, single mip, clamp-to-edge, linear filtering.

use pano_image::DecodedImage;

/// Half-float RGBA keeps EXR range while staying filterable.
pub const PANORAMA_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

const BYTES_PER_TEXEL: u32 = 8;

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture {width}x{height} exceeds the device limit of {max} texels per side")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// A GPU texture with its view and ready-to-bind bind group.
pub struct PanoramaTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}

/// Shared sampler and bind group layout for panorama textures (group 1).
pub struct PanoramaTextures {
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl PanoramaTextures {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("panorama-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("panorama-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            sampler,
            bind_group_layout,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Upload a decoded image as a new texture.
    pub fn create_from_image(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
    ) -> Result<PanoramaTexture, TextureError> {
        validate_dimensions(image.width, image.height)?;
        validate_limit(
            image.width,
            image.height,
            device.limits().max_texture_dimension_2d,
        )?;
        let data = image.to_rgba_f16_bytes();
        self.create_from_rgba_f16(device, queue, label, &data, image.width, image.height)
    }

    /// 1x1 mid-gray texture bound until the first image arrives.
    pub fn placeholder(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> PanoramaTexture {
        let gray = DecodedImage::new(1, 1, vec![0.5, 0.5, 0.5]);
        let data = gray.to_rgba_f16_bytes();
        self.upload(device, queue, "panorama-placeholder", &data, 1, 1)
    }

    /// Upload pre-packed RGBA f16 texels.
    pub fn create_from_rgba_f16(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<PanoramaTexture, TextureError> {
        validate_dimensions(width, height)?;
        validate_data_size(data, width, height)?;
        Ok(self.upload(device, queue, label, data, width, height))
    }

    fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> PanoramaTexture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PANORAMA_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * BYTES_PER_TEXEL),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::info!("Created texture '{label}' ({width}x{height})");
        PanoramaTexture {
            texture,
            view,
            bind_group,
            dimensions: (width, height),
        }
    }
}

fn expected_byte_size(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_TEXEL as usize
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_limit(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

fn validate_data_size(data: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    let expected = expected_byte_size(width, height);
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}
