//! Edge extrusion
//!
//! Surrounds a sprite with a 1px border that repeats its outermost pixels, so
//! bilinear sampling at the sprite edge never pulls in a neighbour's texels.

use image::{imageops, RgbaImage};

/// Width of the border added on every side.
pub const EXTRUDE: u32 = 1;

/// Produce a `(w+2) x (h+2)` tile with `source` pasted at (1, 1).
///
/// Border rows/columns copy the nearest source edge; the four corners copy the
/// matching source corner.
pub fn extrude(source: &RgbaImage) -> RgbaImage {
    let (w, h) = source.dimensions();
    let mut tile = RgbaImage::new(w + 2 * EXTRUDE, h + 2 * EXTRUDE);
    if w == 0 || h == 0 {
        return tile;
    }

    imageops::replace(&mut tile, source, EXTRUDE as i64, EXTRUDE as i64);

    for x in 0..w {
        tile.put_pixel(x + 1, 0, *source.get_pixel(x, 0));
        tile.put_pixel(x + 1, h + 1, *source.get_pixel(x, h - 1));
    }
    for y in 0..h {
        tile.put_pixel(0, y + 1, *source.get_pixel(0, y));
        tile.put_pixel(w + 1, y + 1, *source.get_pixel(w - 1, y));
    }

    tile.put_pixel(0, 0, *source.get_pixel(0, 0));
    tile.put_pixel(w + 1, 0, *source.get_pixel(w - 1, 0));
    tile.put_pixel(0, h + 1, *source.get_pixel(0, h - 1));
    tile.put_pixel(w + 1, h + 1, *source.get_pixel(w - 1, h - 1));

    tile
}

/// The clean interior of an extruded tile (the original pixels).
pub fn interior(tile: &RgbaImage) -> RgbaImage {
    let w = tile.width().saturating_sub(2 * EXTRUDE);
    let h = tile.height().saturating_sub(2 * EXTRUDE);
    imageops::crop_imm(tile, EXTRUDE, EXTRUDE, w, h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 3x2 image with a distinct color per pixel.
    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 40) as u8, (y * 40) as u8, 7, 255]))
    }

    #[test]
    fn test_extrude_size() {
        let tile = extrude(&gradient(3, 2));
        assert_eq!(tile.dimensions(), (5, 4));
    }

    #[test]
    fn test_interior_matches_source() {
        let source = gradient(4, 3);
        let tile = extrude(&source);
        assert_eq!(interior(&tile), source);
    }

    #[test]
    fn test_edges_copy_nearest_source_pixel() {
        let source = gradient(3, 2);
        let tile = extrude(&source);
        let (w, h) = source.dimensions();

        for x in 0..w {
            assert_eq!(tile.get_pixel(x + 1, 0), source.get_pixel(x, 0));
            assert_eq!(tile.get_pixel(x + 1, h + 1), source.get_pixel(x, h - 1));
        }
        for y in 0..h {
            assert_eq!(tile.get_pixel(0, y + 1), source.get_pixel(0, y));
            assert_eq!(tile.get_pixel(w + 1, y + 1), source.get_pixel(w - 1, y));
        }
    }

    #[test]
    fn test_corners_copy_source_corners() {
        let source = gradient(3, 2);
        let tile = extrude(&source);

        assert_eq!(tile.get_pixel(0, 0), source.get_pixel(0, 0));
        assert_eq!(tile.get_pixel(4, 0), source.get_pixel(2, 0));
        assert_eq!(tile.get_pixel(0, 3), source.get_pixel(0, 1));
        assert_eq!(tile.get_pixel(4, 3), source.get_pixel(2, 1));
    }

    #[test]
    fn test_single_pixel_fills_whole_tile() {
        let color = Rgba([1, 2, 3, 200]);
        let tile = extrude(&RgbaImage::from_pixel(1, 1, color));
        assert_eq!(tile.dimensions(), (3, 3));
        assert!(tile.pixels().all(|p| *p == color));
    }
}
