//! Metadata emitters for the packed atlas.
//!
//! All emitters read the same [`AtlasData`]: the finalized sprite arena, the
//! accepted animations, and the 16-bit tables derived from them. The tables are
//! built once, with overflow checks, so every artifact agrees on coordinates.
//!
//! # Supported Formats
//!
//! - **C declarations** (`atlas_data.h`): record types, ID enums, extern arrays
//! - **C definitions** (`atlas_data.c`): sprite and animation array literals
//! - **Debug view** (`atlas_debug.html`): atlas overlay with per-sprite boxes

pub mod c_header;
pub mod debug_html;

pub use c_header::{CHeaderExporter, CSourceExporter};
pub use debug_html::DebugHtmlExporter;

use crate::extrude::EXTRUDE;
use crate::output::OutputError;
use crate::sprite::{resolve_canonical, AnimationRecord, SpriteKind, SpriteRecord};

/// One `SpriteMeta` row, exactly as emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteMeta {
    /// Clean region origin (extruded tile origin plus one)
    pub x: u16,
    pub y: u16,
    /// Trimmed size
    pub w: u16,
    pub h: u16,
    pub off_x: u16,
    pub off_y: u16,
    pub orig_w: u16,
    pub orig_h: u16,
}

/// One `AnimDef` row, exactly as emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimDef {
    pub start: u16,
    pub frame_count: u16,
    pub default_speed: f32,
    pub looping: bool,
}

fn narrow(symbol: &str, field: &'static str, value: impl Into<u64>) -> Result<u16, OutputError> {
    let value = value.into();
    u16::try_from(value).map_err(|_| OutputError::FieldOverflow {
        symbol: symbol.to_string(),
        field,
        value,
    })
}

impl SpriteMeta {
    /// Row for `record`, resolved through its canonical sprite for aliases.
    pub fn for_record(records: &[SpriteRecord], record: &SpriteRecord) -> Result<Self, OutputError> {
        let symbol = record.symbol.as_str();
        let canonical = resolve_canonical(records, record.id).ok_or_else(|| {
            let of = match record.kind {
                SpriteKind::Alias { of } => of,
                SpriteKind::Canonical { .. } => record.id,
            };
            OutputError::UnresolvedAlias { symbol: symbol.to_string(), of }
        })?;
        let pos = canonical.atlas_pos().unwrap_or_default();
        let trim = &canonical.trim;

        Ok(Self {
            x: narrow(symbol, "x", pos.x as u64 + EXTRUDE as u64)?,
            y: narrow(symbol, "y", pos.y as u64 + EXTRUDE as u64)?,
            w: narrow(symbol, "w", trim.trimmed.w)?,
            h: narrow(symbol, "h", trim.trimmed.h)?,
            off_x: narrow(symbol, "offX", trim.offset.x)?,
            off_y: narrow(symbol, "offY", trim.offset.y)?,
            orig_w: narrow(symbol, "origW", trim.original.w)?,
            orig_h: narrow(symbol, "origH", trim.original.h)?,
        })
    }
}

impl AnimDef {
    pub fn for_animation(anim: &AnimationRecord) -> Result<Self, OutputError> {
        Ok(Self {
            start: narrow(&anim.symbol, "startSpriteID", anim.start.index() as u64)?,
            frame_count: narrow(&anim.symbol, "frameCount", anim.frame_count as u64)?,
            default_speed: anim.default_speed,
            looping: anim.looping,
        })
    }
}

/// Everything the emitters need, validated for 16-bit output.
#[derive(Debug, Clone)]
pub struct AtlasData<'a> {
    pub records: &'a [SpriteRecord],
    pub animations: &'a [AnimationRecord],
    /// One row per record, in ID order
    pub sprite_meta: Vec<SpriteMeta>,
    /// One row per animation, in detection order
    pub anim_defs: Vec<AnimDef>,
    /// Canvas edge length in pixels
    pub canvas: u32,
}

impl<'a> AtlasData<'a> {
    /// Build the output tables.
    ///
    /// Fails with [`OutputError::FieldOverflow`] on the first value that does
    /// not fit in 16 bits, or if an alias does not resolve to a canonical sprite.
    pub fn new(
        records: &'a [SpriteRecord],
        animations: &'a [AnimationRecord],
        canvas: u32,
    ) -> Result<Self, OutputError> {
        let sprite_meta = records
            .iter()
            .map(|record| SpriteMeta::for_record(records, record))
            .collect::<Result<Vec<_>, _>>()?;
        let anim_defs =
            animations.iter().map(AnimDef::for_animation).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records, animations, sprite_meta, anim_defs, canvas })
    }

    pub fn unique_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_alias()).count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.records.len() - self.unique_count()
    }
}

/// Trait for metadata emitters.
pub trait Exporter {
    /// Render the artifact as text.
    fn render(&self, data: &AtlasData<'_>) -> String;
}
