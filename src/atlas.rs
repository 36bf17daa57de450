//! Atlas packing - places extruded tiles on a fixed square canvas
//!
//! Implements greedy shelf packing: tiles are sorted by height (tallest first)
//! and laid out left to right in horizontal shelves, each tile followed by a
//! uniform padding margin.

use crate::sprite::{Point, Size, SpriteId};
use image::{imageops, RgbaImage};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Supported square canvas sizes.
pub const SUPPORTED_SIZES: [u32; 6] = [256, 512, 1024, 2048, 4096, 8192];

/// A tile waiting to be packed.
#[derive(Debug, Clone)]
pub struct PackItem {
    pub id: SpriteId,
    pub name: String,
    /// Extruded tile size (without padding)
    pub size: Size,
}

/// Accepted placement of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: SpriteId,
    /// Top-left of the extruded tile
    pub pos: Point,
    /// Extruded tile size (without padding)
    pub size: Size,
}

/// A tile that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnplacedSprite {
    pub id: SpriteId,
    pub name: String,
    pub size: Size,
}

impl fmt::Display for UnplacedSprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.size)
    }
}

/// Packing failure. Lists every tile that did not fit.
#[derive(Debug, Clone, Error)]
pub enum PackError {
    #[error(
        "Failed to pack {} sprite(s) into {canvas}x{canvas} atlas (atlas too small):\n{}",
        .unplaced.len(),
        .unplaced.iter().map(|s| format!("  - {}", s)).collect::<Vec<_>>().join("\n")
    )]
    DoesNotFit { canvas: u32, unplaced: Vec<UnplacedSprite> },
}

/// Shelf packing cursor.
///
/// Lives only for one packing pass.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    /// Next free x on the current shelf
    x: u32,
    /// Top of the current shelf
    y: u32,
    /// Tallest padded tile on the current shelf
    shelf_height: u32,
}

impl ShelfPacker {
    /// Create a packer for a `width` x `height` canvas.
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self { width, height, padding, x: padding, y: padding, shelf_height: 0 }
    }

    /// Current cursor as `(x, y, shelf_height)`.
    pub fn cursor(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.shelf_height)
    }

    /// Try to place a tile; returns its top-left on success.
    ///
    /// A failed placement leaves the cursor untouched so later, smaller tiles
    /// still get a chance.
    pub fn place(&mut self, tile: Size) -> Option<Point> {
        let padded_w = tile.w.checked_add(self.padding)?;
        let padded_h = tile.h.checked_add(self.padding)?;

        if self.x.checked_add(padded_w)? <= self.width {
            if self.y.checked_add(padded_h)? > self.height {
                return None;
            }
            let pos = Point::new(self.x, self.y);
            self.x += padded_w;
            self.shelf_height = self.shelf_height.max(padded_h);
            return Some(pos);
        }

        let shelf_y = self.y.checked_add(self.shelf_height)?;
        if shelf_y.checked_add(padded_h)? > self.height {
            return None;
        }
        if self.padding.checked_add(padded_w)? > self.width {
            return None;
        }

        self.x = self.padding + padded_w;
        self.y = shelf_y;
        self.shelf_height = padded_h;
        Some(Point::new(self.padding, shelf_y))
    }
}

/// Order in which tiles are offered to the packer: tallest first, ties kept in
/// input (ID) order.
pub fn pack_order(items: &[PackItem]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].size.h.cmp(&items[a].size.h));
    order
}

/// Pack every tile onto a `canvas` x `canvas` atlas.
///
/// Placements are returned in the same order as `items`. If any tile fails,
/// packing continues to collect every failure before returning the error.
pub fn pack_tiles(
    items: &[PackItem],
    canvas: u32,
    padding: u32,
) -> Result<Vec<Placement>, PackError> {
    let mut packer = ShelfPacker::new(canvas, canvas, padding);
    let mut placed: Vec<Option<Point>> = vec![None; items.len()];
    let mut unplaced = Vec::new();

    for index in pack_order(items) {
        let item = &items[index];
        match packer.place(item.size) {
            Some(pos) => placed[index] = Some(pos),
            None => unplaced.push(UnplacedSprite {
                id: item.id,
                name: item.name.clone(),
                size: item.size,
            }),
        }
    }

    if !unplaced.is_empty() {
        return Err(PackError::DoesNotFit { canvas, unplaced });
    }

    Ok(items
        .iter()
        .zip(placed)
        .filter_map(|(item, pos)| pos.map(|pos| Placement { id: item.id, pos, size: item.size }))
        .collect())
}

/// Composite tiles onto a transparent square canvas.
///
/// Pixels are copied verbatim, no blending.
pub fn compose_atlas<'a, I>(canvas: u32, tiles: I) -> RgbaImage
where
    I: IntoIterator<Item = (Point, &'a RgbaImage)>,
{
    let mut atlas = RgbaImage::new(canvas, canvas);
    for (pos, tile) in tiles {
        imageops::replace(&mut atlas, tile, pos.x as i64, pos.y as i64);
    }
    atlas
}
