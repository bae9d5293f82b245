//! 2x box-filter downsampling for oversized panoramas.

use crate::decode::DecodedImage;

/// Images taller than this are halved by default.
pub const DEFAULT_HALVE_THRESHOLD: u32 = 2000;

/// Halve `image` when both dimensions are even and its height exceeds
/// `threshold`. Each output pixel is the mean of the matching 2x2 block.
/// Otherwise the input is returned unchanged.
pub fn halve_if_oversized(image: DecodedImage, threshold: u32) -> DecodedImage {
    let (w, h) = (image.width, image.height);
    if w % 2 != 0 || h % 2 != 0 || h <= threshold {
        return image;
    }

    let (out_w, out_h) = (w / 2, h / 2);
    let src_row = w as usize * 3;
    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize * 3);

    for oy in 0..out_h as usize {
        let top = &image.pixels[2 * oy * src_row..(2 * oy + 1) * src_row];
        let bottom = &image.pixels[(2 * oy + 1) * src_row..(2 * oy + 2) * src_row];
        for ox in 0..out_w as usize {
            let left = 6 * ox;
            for c in 0..3 {
                let sum =
                    top[left + c] + top[left + 3 + c] + bottom[left + c] + bottom[left + 3 + c];
                pixels.push(sum * 0.25);
            }
        }
    }

    tracing::debug!("Halved {}x{} image to {}x{}", w, h, out_w, out_h);
    DecodedImage::new(out_w, out_h, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic sample with distinct values inside every 2x2 block.
    fn sample(x: u32, y: u32) -> [f32; 3] {
        [
            ((x * 7 + y * 13) % 256) as f32 / 255.0,
            ((x + y) % 2) as f32,
            (x % 3) as f32 * 0.5,
        ]
    }

    fn pattern(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&sample(x, y));
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn block_mean(ox: u32, oy: u32) -> [f32; 3] {
        let mut out = [0.0; 3];
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let p = sample(2 * ox + dx, 2 * oy + dy);
            for c in 0..3 {
                out[c] += p[c] * 0.25;
            }
        }
        out
    }

    #[test]
    fn test_4000_square_halved_to_block_means() {
        let out = halve_if_oversized(pattern(4000, 4000), DEFAULT_HALVE_THRESHOLD);
        assert_eq!((out.width, out.height), (2000, 2000));
        assert_eq!(out.pixels.len(), 2000 * 2000 * 3);

        for oy in (0..2000).step_by(97) {
            for ox in (0..2000).step_by(89) {
                let expected = block_mean(ox, oy);
                let got = out.pixel(ox, oy);
                for c in 0..3 {
                    assert!(
                        (got[c] - expected[c]).abs() < 1e-6,
                        "pixel ({ox}, {oy}) channel {c}: {} != {}",
                        got[c],
                        expected[c]
                    );
                }
            }
        }
        let last = out.pixel(1999, 1999);
        assert_eq!(last, block_mean(1999, 1999));
    }

    #[test]
    fn test_odd_width_skipped() {
        let src = pattern(2001, 2002);
        let out = halve_if_oversized(src.clone(), DEFAULT_HALVE_THRESHOLD);
        assert_eq!(out, src);
    }

    #[test]
    fn test_odd_height_skipped() {
        let src = pattern(2002, 2001);
        let out = halve_if_oversized(src.clone(), 2000);
        assert_eq!(out, src);
    }

    #[test]
    fn test_2001_by_2000_unchanged() {
        let src = pattern(2001, 2000);
        let out = halve_if_oversized(src.clone(), DEFAULT_HALVE_THRESHOLD);
        assert_eq!((out.width, out.height), (2001, 2000));
        assert_eq!(out, src);
    }

    #[test]
    fn test_height_at_threshold_unchanged() {
        let src = pattern(4000, 2000);
        let out = halve_if_oversized(src.clone(), 2000);
        assert_eq!(out, src);
    }

    #[test]
    fn test_small_block_average() {
        let src = DecodedImage::new(
            2,
            2,
            vec![
                0.0, 1.0, 2.0, //
                4.0, 5.0, 6.0, //
                8.0, 9.0, 10.0, //
                12.0, 13.0, 14.0,
            ],
        );
        let out = halve_if_oversized(src, 1);
        assert_eq!((out.width, out.height), (1, 1));
        assert_eq!(out.pixels, vec![6.0, 7.0, 8.0]);
    }
}
