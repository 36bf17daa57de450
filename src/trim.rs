//! Sprite loading and transparent-edge trimming
//!
//! Decodes a source image to RGBA, crops it to the tight bounding box of
//! non-transparent pixels, and records where that box sat in the original.

use crate::dedup::content_hash;
use crate::sprite::{Point, Size, TrimInfo};
use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading a source sprite. Always fatal for the build.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Decoder rejected the file
    #[error("Failed to open image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Decoder returned an image with no pixels
    #[error("Image {} has zero size", .0.display())]
    Empty(PathBuf),
}

/// A decoded and trimmed sprite, before deduplication.
#[derive(Debug, Clone)]
pub struct LoadedSprite {
    /// File stem used for symbols and animation detection
    pub name: String,
    pub path: PathBuf,
    pub trim: TrimInfo,
    /// Trimmed pixels; dropped once the sprite is extruded
    pub image: RgbaImage,
    /// Digest of the normalized trimmed pixels
    pub hash: String,
}

/// Result of trimming one image.
#[derive(Debug, Clone)]
pub struct Trimmed {
    pub image: RgbaImage,
    pub offset: Point,
}

impl Trimmed {
    pub fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

/// Tight bounding box `(x, y, w, h)` of pixels with non-zero alpha.
///
/// Returns `None` when every pixel is fully transparent.
pub fn alpha_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = image.dimensions();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found || width == 0 || height == 0 {
        return None;
    }
    Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop an image to its non-transparent content.
///
/// A fully transparent image degenerates to a 1x1 transparent placeholder at
/// offset (0, 0) so every sprite keeps a drawable, non-empty region.
pub fn trim_image(image: &RgbaImage) -> Trimmed {
    match alpha_bounds(image) {
        Some((x, y, w, h)) => Trimmed {
            image: imageops::crop_imm(image, x, y, w, h).to_image(),
            offset: Point::new(x, y),
        },
        None => Trimmed { image: RgbaImage::new(1, 1), offset: Point::new(0, 0) },
    }
}

/// Derive the sprite name from a file path (the file stem).
pub fn sprite_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Build a [`LoadedSprite`] from an already decoded image.
pub fn trim_decoded(name: String, path: PathBuf, decoded: &RgbaImage) -> LoadedSprite {
    let original = Size::new(decoded.width(), decoded.height());
    let trimmed = trim_image(decoded);
    let trim = TrimInfo { original, trimmed: trimmed.size(), offset: trimmed.offset };
    let hash = content_hash(&trimmed.image);

    LoadedSprite { name, path, trim, image: trimmed.image, hash }
}

/// Decode, trim and hash one source file.
///
/// Any failure is returned to the caller; the pipeline treats it as fatal.
pub fn load_sprite(path: &Path) -> Result<LoadedSprite, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let decoded = image::open(path)
        .map_err(|source| LoadError::Decode { path: path.to_path_buf(), source })?
        .to_rgba8();

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    Ok(trim_decoded(sprite_name(path), path.to_path_buf(), &decoded))
}
