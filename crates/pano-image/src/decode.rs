//! Extension-based dispatch to the raster and EXR decoders.

use std::path::Path;
use std::time::Instant;

use crate::error::DecodeError;
use crate::resample::{DEFAULT_HALVE_THRESHOLD, halve_if_oversized};

/// A decoded image as interleaved RGB floats, row-major.
///
/// Samples are linear. Raster input is normalised to `[0, 1]`; EXR values are
/// left as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `height * width * 3` samples.
    pub pixels: Vec<f32>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<f32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 3);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let base = (y as usize * self.width as usize + x as usize) * 3;
        [
            self.pixels[base],
            self.pixels[base + 1],
            self.pixels[base + 2],
        ]
    }

    /// Pack as RGBA `f16` little-endian bytes (alpha = 1.0) for an
    /// `Rgba16Float` texture upload. Row stride is `width * 8` bytes.
    pub fn to_rgba_f16_bytes(&self) -> Vec<u8> {
        let one = half::f16::ONE.to_le_bytes();
        let mut out = Vec::with_capacity(self.pixel_count() * 8);
        for rgb in self.pixels.chunks_exact(3) {
            for &c in rgb {
                out.extend_from_slice(&half::f16::from_f32(c).to_le_bytes());
            }
            out.extend_from_slice(&one);
        }
        out
    }
}

/// Options applied after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Halve images whose height exceeds this value. `None` disables halving.
    pub halve_threshold: Option<u32>,
    /// Allow the EXR decoder. Ignored when the crate is built without it.
    pub exr: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            halve_threshold: Some(DEFAULT_HALVE_THRESHOLD),
            exr: true,
        }
    }
}

impl DecodeOptions {
    /// Whether `.exr` files can be decoded with these options in this build.
    pub fn exr_available(&self) -> bool {
        self.exr && cfg!(feature = "exr")
    }
}

/// Load an image from disk, dispatching on the (case-insensitive) extension.
///
/// `.exr` goes to [`load_exr`]; everything else to [`load_raster`].
pub fn load_image(path: &Path, options: &DecodeOptions) -> Result<DecodedImage, DecodeError> {
    let start = Instant::now();

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| DecodeError::UnsupportedExtension {
            path: path.to_path_buf(),
        })?;

    let image = if ext == "exr" {
        if !options.exr_available() {
            return Err(DecodeError::MissingComponent {
                component: "exr",
                path: path.to_path_buf(),
            });
        }
        load_exr(path)?
    } else {
        load_raster(path)?
    };
    let (src_w, src_h) = (image.width, image.height);

    let image = match options.halve_threshold {
        Some(threshold) => halve_if_oversized(image, threshold),
        None => image,
    };

    tracing::info!(
        "Decoded {} ({}x{} -> {}x{}) in {:.1} ms",
        path.display(),
        src_w,
        src_h,
        image.width,
        image.height,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(image)
}

/// Convert one sRGB-encoded channel in `[0, 1]` to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Decode any format the `image` crate understands into normalised linear
/// RGB floats. Integer formats are sRGB-encoded and get linearised; float
/// formats (Radiance HDR) are already linear.
pub fn load_raster(path: &Path) -> Result<DecodedImage, DecodeError> {
    let io_err = |source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = image::ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;
    let decoded = reader.decode().map_err(|source| DecodeError::Raster {
        path: path.to_path_buf(),
        source,
    })?;

    let color = decoded.color();
    let rgb = decoded.to_rgb32f();
    let (width, height) = rgb.dimensions();
    let mut pixels = rgb.into_raw();
    if !matches!(color, image::ColorType::Rgb32F | image::ColorType::Rgba32F) {
        for c in &mut pixels {
            *c = srgb_to_linear(*c);
        }
    }
    tracing::debug!("Raster {} is {:?}", path.display(), color);
    Ok(DecodedImage::new(width, height, pixels))
}

/// Decode the R, G, B channels of the first layer of an OpenEXR file.
///
/// Dimensions come from the layer's data window. Samples are kept as stored.
#[cfg(feature = "exr")]
pub fn load_exr(path: &Path) -> Result<DecodedImage, DecodeError> {
    use exr::prelude::read_first_rgba_layer_from_file;

    if let Err(source) = std::fs::metadata(path) {
        return Err(DecodeError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    let image = read_first_rgba_layer_from_file(
        path,
        |resolution, _| {
            let (w, h) = (resolution.width(), resolution.height());
            (w, vec![0.0_f32; w * h * 3])
        },
        |(width, pixels): &mut (usize, Vec<f32>), position, (r, g, b, _a): (f32, f32, f32, f32)| {
            let base = (position.y() * *width + position.x()) * 3;
            pixels[base] = r;
            pixels[base + 1] = g;
            pixels[base + 2] = b;
        },
    )
    .map_err(|e| DecodeError::Exr {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let size = image.layer_data.size;
    let (_, pixels) = image.layer_data.channel_data.pixels;
    Ok(DecodedImage::new(size.width() as u32, size.height() as u32, pixels))
}

/// Built without the `exr` feature: every EXR load reports the missing decoder.
#[cfg(not(feature = "exr"))]
pub fn load_exr(path: &Path) -> Result<DecodedImage, DecodeError> {
    Err(DecodeError::MissingComponent {
        component: "exr",
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(
        dir: &Path,
        name: &str,
        width: u32,
        height: u32,
        rgb: [u8; 3],
    ) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_png_normalised_to_unit_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "pano.png", 4, 2, [255, 0, 51]);

        let img = load_image(&path, &DecodeOptions::default()).unwrap();
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(img.pixels.len(), 4 * 2 * 3);
        let [r, g, b] = img.pixel(3, 1);
        assert!((r - 1.0).abs() < 1e-6);
        assert!(g.abs() < 1e-6);
        assert!((b - srgb_to_linear(0.2)).abs() < 1e-6);
    }

    #[test]
    fn test_raster_samples_are_linearised() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "gray.png", 2, 2, [128, 128, 128]);

        let img = load_image(&path, &DecodeOptions::default()).unwrap();
        for c in img.pixel(1, 1) {
            assert!((c - 0.2159).abs() < 1e-3, "sRGB 128 decoded to {c}");
        }
    }

    #[test]
    fn test_srgb_to_linear_curve() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        // Linear segment below the knee.
        assert!((srgb_to_linear(0.04) - 0.04 / 12.92).abs() < 1e-9);
        assert!((srgb_to_linear(150.0 / 255.0) - 0.30499).abs() < 1e-4);
    }

    #[test]
    fn test_uppercase_extension_dispatches_to_raster() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "PANO.PNG", 2, 2, [0, 0, 0]);
        assert!(load_image(&path, &DecodeOptions::default()).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_image(&dir.path().join("absent.png"), &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::Io { .. })));
    }

    #[test]
    fn test_garbage_file_is_raster_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = load_image(&path, &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::Raster { .. })));
    }

    #[test]
    fn test_no_extension_rejected() {
        let result = load_image(Path::new("panorama"), &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::UnsupportedExtension { .. })));
    }

    #[test]
    fn test_halving_applied_after_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tall.png", 4, 8, [10, 20, 30]);

        let opts = DecodeOptions {
            halve_threshold: Some(4),
            ..Default::default()
        };
        let img = load_image(&path, &opts).unwrap();
        assert_eq!((img.width, img.height), (2, 4));

        let opts = DecodeOptions {
            halve_threshold: None,
            ..Default::default()
        };
        let img = load_image(&path, &opts).unwrap();
        assert_eq!((img.width, img.height), (4, 8));
    }

    #[test]
    fn test_rgba_f16_packing() {
        let img = DecodedImage::new(2, 1, vec![0.0, 0.5, 1.0, 2.0, 4.0, -1.0]);
        let bytes = img.to_rgba_f16_bytes();
        assert_eq!(bytes.len(), 2 * 8);

        let texel = |i: usize| {
            half::f16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]).to_f32()
        };
        assert_eq!([texel(0), texel(1), texel(2), texel(3)], [0.0, 0.5, 1.0, 1.0]);
        assert_eq!([texel(4), texel(5), texel(6), texel(7)], [2.0, 4.0, -1.0, 1.0]);
    }

    #[test]
    fn test_exr_without_decoder_reports_missing_component() {
        let opts = DecodeOptions {
            exr: false,
            ..Default::default()
        };
        assert!(!opts.exr_available());
        let result = load_image(Path::new("sky.EXR"), &opts);
        match result {
            Err(DecodeError::MissingComponent { component, .. }) => assert_eq!(component, "exr"),
            other => panic!("expected MissingComponent, got {other:?}"),
        }
    }

    #[cfg(feature = "exr")]
    #[test]
    fn test_exr_roundtrip_keeps_hdr_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.exr");
        exr::prelude::write_rgb_file(&path, 3, 2, |x, y| (x as f32 * 2.5, y as f32, 0.25)).unwrap();

        let img = load_image(&path, &DecodeOptions::default()).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixel(2, 1), [5.0, 1.0, 0.25]);
        assert_eq!(img.pixel(0, 0), [0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_exr_availability_follows_build() {
        assert_eq!(DecodeOptions::default().exr_available(), cfg!(feature = "exr"));
    }

    #[cfg(feature = "exr")]
    #[test]
    fn test_missing_exr_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_image(&dir.path().join("gone.exr"), &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::Io { .. })));
    }
}
