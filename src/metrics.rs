//! Trim savings and atlas fill metrics
//!
//! Purely informational; nothing here can fail a build.

use crate::sprite::TrimInfo;
use serde::Serialize;

/// Summary numbers for one build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtlasMetrics {
    /// Sum of original (untrimmed) sprite areas, all sprites
    pub original_px: u64,
    /// Sum of trimmed sprite areas, all sprites
    pub trimmed_px: u64,
    /// Percentage of original area removed by trimming
    pub trim_savings: f64,
    /// Sum of extruded tile areas, canonical sprites only
    pub used_px: u64,
    pub canvas_px: u64,
    /// Percentage of the canvas covered by tiles
    pub density: f64,
    /// `100 - density`
    pub waste: f64,
}

/// How full the atlas is relative to the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityLevel {
    Normal,
    /// Above the informational threshold
    Info,
    /// Above the warning threshold
    Warn,
}

/// Trimming totals as `(original_px, trimmed_px, savings_percent)`.
pub fn trim_savings<'a, I>(sprites: I) -> (u64, u64, f64)
where
    I: IntoIterator<Item = &'a TrimInfo>,
{
    let (original, trimmed) = sprites
        .into_iter()
        .fold((0u64, 0u64), |(o, t), info| (o + info.original.area(), t + info.trimmed.area()));

    if original == 0 {
        return (0, 0, 0.0);
    }
    let saved = original.saturating_sub(trimmed);
    (original, trimmed, saved as f64 / original as f64 * 100.0)
}

/// Compute all metrics.
///
/// `all` covers every sprite (aliases included); `packed` only the sprites that
/// own a tile.
pub fn compute<'a, A, P>(all: A, packed: P, canvas: u32) -> AtlasMetrics
where
    A: IntoIterator<Item = &'a TrimInfo>,
    P: IntoIterator<Item = &'a TrimInfo>,
{
    let (original_px, trimmed_px, trim_savings) = trim_savings(all);
    let used_px: u64 = packed.into_iter().map(|info| info.extruded().area()).sum();
    let canvas_px = canvas as u64 * canvas as u64;
    let density = if canvas_px == 0 { 0.0 } else { used_px as f64 / canvas_px as f64 * 100.0 };

    AtlasMetrics {
        original_px,
        trimmed_px,
        trim_savings,
        used_px,
        canvas_px,
        density,
        waste: 100.0 - density,
    }
}

impl AtlasMetrics {
    /// Classify density against `info` and `warn` thresholds (percent).
    pub fn level(&self, info: f64, warn: f64) -> DensityLevel {
        if self.density > warn {
            DensityLevel::Warn
        } else if self.density > info {
            DensityLevel::Info
        } else {
            DensityLevel::Normal
        }
    }
}
