//! Content-hash deduplication
//!
//! Sprites whose trimmed pixels are identical share one tile in the atlas.
//! Fully transparent pixels are normalized before hashing so stray RGB values
//! under zero alpha never split otherwise identical sprites.

use crate::sprite::SpriteId;
use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Serialize pixels as RGBA bytes with RGB forced to zero wherever alpha is zero.
pub fn normalize_pixels(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        if pixel[3] == 0 {
            bytes.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            bytes.extend_from_slice(&pixel.0);
        }
    }
    bytes
}

/// SHA-256 hex digest of the normalized pixel stream.
///
/// The dimensions are hashed too, so a 2x1 and a 1x2 sprite of the same color
/// never collide.
pub fn content_hash(image: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(normalize_pixels(image));
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}

/// Outcome of the deduplication pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dedup {
    /// For each sprite ID, the canonical sprite it aliases (or `None`)
    pub alias_of: Vec<Option<SpriteId>>,
    /// Canonical sprites in ascending ID order
    pub canonical: Vec<SpriteId>,
    pub duplicates: usize,
}

impl Dedup {
    /// Every sprite canonical; used when deduplication is turned off.
    pub fn disabled(count: usize) -> Self {
        Self {
            alias_of: vec![None; count],
            canonical: (0..count).map(SpriteId).collect(),
            duplicates: 0,
        }
    }
}

/// Group sprites by hash; the lowest ID per hash wins.
///
/// `hashes` must be indexed by sprite ID. The result depends only on that
/// order, never on how the hashes were computed.
pub fn deduplicate<S: AsRef<str>>(hashes: &[S]) -> Dedup {
    let mut first_seen: HashMap<&str, SpriteId> = HashMap::new();
    let mut alias_of = Vec::with_capacity(hashes.len());
    let mut canonical = Vec::new();
    let mut duplicates = 0;

    for (index, hash) in hashes.iter().enumerate() {
        let id = SpriteId(index);
        match first_seen.get(hash.as_ref()) {
            Some(&original) => {
                alias_of.push(Some(original));
                duplicates += 1;
            }
            None => {
                first_seen.insert(hash.as_ref(), id);
                alias_of.push(None);
                canonical.push(id);
            }
        }
    }

    Dedup { alias_of, canonical, duplicates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_normalize_zeroes_invisible_rgb() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
        image.put_pixel(1, 0, Rgba([1, 2, 3, 4]));

        assert_eq!(normalize_pixels(&image), vec![0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_hash_ignores_rgb_under_zero_alpha() {
        let a = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        let b = RgbaImage::from_pixel(3, 3, Rgba([255, 17, 99, 0]));
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_hash_distinguishes_visible_pixels() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([10, 0, 0, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([11, 0, 0, 255]));
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_hash_distinguishes_shape() {
        let wide = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]));
        let tall = RgbaImage::from_pixel(1, 2, Rgba([9, 9, 9, 255]));
        assert_ne!(content_hash(&wide), content_hash(&tall));
    }

    #[test]
    fn test_deduplicate_lowest_id_wins() {
        let hashes = ["a", "b", "a", "c", "b", "a"];
        let dedup = deduplicate(&hashes);

        assert_eq!(dedup.canonical, vec![SpriteId(0), SpriteId(1), SpriteId(3)]);
        assert_eq!(dedup.duplicates, 3);
        assert_eq!(
            dedup.alias_of,
            vec![None, None, Some(SpriteId(0)), None, Some(SpriteId(1)), Some(SpriteId(0))]
        );
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let hashes = vec!["x".to_string(), "y".to_string(), "x".to_string()];
        assert_eq!(deduplicate(&hashes), deduplicate(&hashes));
    }

    #[test]
    fn test_deduplicate_empty() {
        let hashes: [&str; 0] = [];
        let dedup = deduplicate(&hashes);
        assert!(dedup.canonical.is_empty());
        assert_eq!(dedup.duplicates, 0);
    }

    #[test]
    fn test_disabled_marks_everything_canonical() {
        let dedup = Dedup::disabled(3);
        assert_eq!(dedup.canonical.len(), 3);
        assert!(dedup.alias_of.iter().all(Option::is_none));
    }
}
