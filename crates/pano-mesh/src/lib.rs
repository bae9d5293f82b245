//! Latitude/longitude sphere tessellation for panorama projection.

mod sphere;

pub use sphere::{MAX_BANDS, SphereMesh, SphereParams, SphereVertex, build_sphere};
