//! UV sphere generation.
//!
//! The grid has `nlat + 1` rows and `nlon + 1` columns. The last column sits
//! at lon = 2π and duplicates the first column's position with u = 1.0, so
//! every quad's right-hand neighbour index is in range and the seam closes
//! without a modulo wrap.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Per-vertex data uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

/// Tessellation parameters for [`build_sphere`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    pub nlat: u32,
    pub nlon: u32,
    pub radius: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            nlat: 50,
            nlon: 50,
            radius: 10.0,
        }
    }
}

impl SphereParams {
    pub fn build(&self) -> SphereMesh {
        build_sphere(self.nlat, self.nlon, self.radius)
    }
}

/// An immutable sphere mesh with quad topology.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub nlat: u32,
    pub nlon: u32,
    pub vertices: Vec<SphereVertex>,
    /// Four indices per grid cell, cells in row-major order.
    pub quads: Vec<u32>,
}

impl SphereMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len() / 4
    }

    /// Split every quad `[a, b, c, d]` into triangles `[a, b, c]` and `[a, c, d]`.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.quad_count() * 6);
        for quad in self.quads.chunks_exact(4) {
            let (a, b, c, d) = (quad[0], quad[1], quad[2], quad[3]);
            out.extend_from_slice(&[a, b, c, a, c, d]);
        }
        out
    }
}

/// Upper bound on either band count. Keeps every vertex index and buffer
/// size inside `u32`.
pub const MAX_BANDS: u32 = 1024;

/// Build a UV sphere of `radius` with `nlat` latitude and `nlon` longitude bands.
///
/// Band counts are clamped to `1..=MAX_BANDS`.
pub fn build_sphere(nlat: u32, nlon: u32, radius: f32) -> SphereMesh {
    let nlat = clamp_bands(nlat);
    let nlon = clamp_bands(nlon);
    let cols = nlon + 1;

    let mut vertices = Vec::with_capacity(((nlat + 1) * cols) as usize);
    for ilat in 0..=nlat {
        let lat = PI * ilat as f32 / nlat as f32;
        for ilon in 0..=nlon {
            let lon = TAU * ilon as f32 / nlon as f32;
            let dir = Vec3::new(lat.sin() * lon.cos(), lat.cos(), lat.sin() * lon.sin());
            vertices.push(SphereVertex {
                position: (dir * radius).to_array(),
                color: [1.0, 1.0, 1.0, 1.0],
                uv: [lon / TAU, lat / PI],
            });
        }
    }

    let v = |a: u32, b: u32| a * cols + b;
    let mut quads = Vec::with_capacity((nlat * nlon * 4) as usize);
    for ilat in 0..nlat {
        for ilon in 0..nlon {
            quads.extend_from_slice(&[
                v(ilat, ilon),
                v(ilat + 1, ilon),
                v(ilat + 1, ilon + 1),
                v(ilat, ilon + 1),
            ]);
        }
    }

    SphereMesh {
        nlat,
        nlon,
        vertices,
        quads,
    }
}

fn clamp_bands(bands: u32) -> u32 {
    bands.clamp(1, MAX_BANDS)
}
