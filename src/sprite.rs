//! Sprite records - the per-file arena the pipeline stages read from
//!
//! Every source file becomes exactly one [`SpriteRecord`], indexed by a dense,
//! zero-based [`SpriteId`] assigned in sorted-filename order. Stages never
//! renumber records; they produce derived data keyed by ID instead.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Stable sprite identifier (index into the sprite arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SpriteId(pub usize);

impl SpriteId {
    /// Index into the sprite list.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Pixel area as u64 so large atlases cannot overflow.
    pub fn area(self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Top-left position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Geometry captured while trimming a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimInfo {
    /// Size of the decoded source image, never altered
    pub original: Size,
    /// Size of the tight bounding box (at least 1x1)
    pub trimmed: Size,
    /// Top-left of the bounding box relative to the source image
    pub offset: Point,
}

impl TrimInfo {
    /// Size of the tile once the 1px extrusion border is added.
    pub fn extruded(&self) -> Size {
        Size::new(self.trimmed.w + 2, self.trimmed.h + 2)
    }
}

/// Whether a sprite owns atlas space or borrows another sprite's tile.
///
/// An alias has no position of its own; everything it renders resolves through
/// the canonical sprite it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpriteKind {
    /// Owns an extruded tile whose top-left sits at `atlas_pos`
    Canonical { atlas_pos: Point },
    /// Same content as an earlier sprite
    Alias { of: SpriteId },
}

/// A fully processed sprite, read-only once the emitters run.
#[derive(Debug, Clone, Serialize)]
pub struct SpriteRecord {
    pub id: SpriteId,
    /// File stem of the source image
    pub name: String,
    pub path: PathBuf,
    /// Declaration symbol (e.g. `SPR_HERO_IDLE_0`)
    pub symbol: String,
    pub trim: TrimInfo,
    /// Hex digest of the normalized trimmed pixels
    pub hash: String,
    pub kind: SpriteKind,
}

impl SpriteRecord {
    pub fn is_alias(&self) -> bool {
        matches!(self.kind, SpriteKind::Alias { .. })
    }

    /// Extruded tile origin, only for canonical sprites.
    pub fn atlas_pos(&self) -> Option<Point> {
        match self.kind {
            SpriteKind::Canonical { atlas_pos } => Some(atlas_pos),
            SpriteKind::Alias { .. } => None,
        }
    }
}

/// Follow a record to the canonical record that owns its pixels.
///
/// Dedup only ever points an alias at a canonical sprite, so one hop is enough;
/// `None` means the arena is inconsistent.
pub fn resolve_canonical(records: &[SpriteRecord], id: SpriteId) -> Option<&SpriteRecord> {
    let record = records.get(id.index())?;
    match record.kind {
        SpriteKind::Canonical { .. } => Some(record),
        SpriteKind::Alias { of } => {
            let target = records.get(of.index())?;
            match target.kind {
                SpriteKind::Canonical { .. } => Some(target),
                SpriteKind::Alias { .. } => None,
            }
        }
    }
}

/// A detected, validated animation sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationRecord {
    /// Base name shared by every frame (e.g. `soldier_run`)
    pub name: String,
    /// Declaration symbol (e.g. `ANIM_SOLDIER_RUN`)
    pub symbol: String,
    pub start: SpriteId,
    pub frame_count: usize,
    /// Seconds per frame
    pub default_speed: f32,
    pub looping: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, kind: SpriteKind) -> SpriteRecord {
        SpriteRecord {
            id: SpriteId(id),
            name: format!("s{}", id),
            path: PathBuf::from(format!("s{}.png", id)),
            symbol: format!("SPR_S{}", id),
            trim: TrimInfo {
                original: Size::new(4, 4),
                trimmed: Size::new(2, 3),
                offset: Point::new(1, 0),
            },
            hash: String::new(),
            kind,
        }
    }

    #[test]
    fn test_extruded_size_adds_border() {
        let r = record(0, SpriteKind::Canonical { atlas_pos: Point::new(0, 0) });
        assert_eq!(r.trim.extruded(), Size::new(4, 5));
    }

    #[test]
    fn test_resolve_canonical_follows_alias() {
        let records = vec![
            record(0, SpriteKind::Canonical { atlas_pos: Point::new(2, 2) }),
            record(1, SpriteKind::Alias { of: SpriteId(0) }),
        ];
        let resolved = resolve_canonical(&records, SpriteId(1)).unwrap();
        assert_eq!(resolved.id, SpriteId(0));
        assert_eq!(resolved.atlas_pos(), Some(Point::new(2, 2)));
        assert_eq!(records[1].atlas_pos(), None);
    }

    #[test]
    fn test_resolve_canonical_rejects_alias_chain() {
        let records = vec![
            record(0, SpriteKind::Alias { of: SpriteId(1) }),
            record(1, SpriteKind::Alias { of: SpriteId(0) }),
        ];
        assert!(resolve_canonical(&records, SpriteId(0)).is_none());
        assert!(resolve_canonical(&records, SpriteId(5)).is_none());
    }

    #[test]
    fn test_size_area_does_not_overflow() {
        assert_eq!(Size::new(70_000, 70_000).area(), 4_900_000_000);
    }
}
