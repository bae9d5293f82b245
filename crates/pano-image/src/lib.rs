//! Panorama image decoding.
//!
//! Raster formats go through the `image` crate and are normalised to `[0, 1]`
//! floats; OpenEXR files are read through the `exr` crate when the `exr`
//! feature is enabled. Oversized images can be box-filtered down by 2x before
//! upload.

mod decode;
mod error;
mod resample;

pub use decode::{
    DecodeOptions, DecodedImage, load_exr, load_image, load_raster, srgb_to_linear,
};
pub use error::DecodeError;
pub use resample::{DEFAULT_HALVE_THRESHOLD, halve_if_oversized};
