//! Build result types.
//!
//! Contains types for representing the outcome of a build run.

use crate::metrics::AtlasMetrics;
use crate::sprite::{AnimationRecord, SpriteRecord};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a pipeline run that did not fail.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The input directory holds no `.png` files; nothing was produced
    NoInput { input: PathBuf },
    /// The atlas was built (and written unless dry-run)
    Built(BuildReport),
}

impl BuildOutcome {
    /// The report, if an atlas was built.
    pub fn report(&self) -> Option<&BuildReport> {
        match self {
            BuildOutcome::Built(report) => Some(report),
            BuildOutcome::NoInput { .. } => None,
        }
    }

    pub fn is_no_input(&self) -> bool {
        matches!(self, BuildOutcome::NoInput { .. })
    }
}

/// Result of a complete build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Every sprite, indexed by ID
    pub records: Vec<SpriteRecord>,
    /// Accepted animations in detection order
    pub animations: Vec<AnimationRecord>,
    pub metrics: AtlasMetrics,
    /// Artifacts written, or that would have been written in dry-run mode
    pub outputs: Vec<PathBuf>,
    /// Non-fatal findings (lenient animation issues, density advisories)
    pub warnings: Vec<String>,
    /// Total build duration
    pub duration: Duration,
    pub dry_run: bool,
}

impl BuildReport {
    pub fn sprite_count(&self) -> usize {
        self.records.len()
    }

    /// Sprites that own a tile in the atlas.
    pub fn unique_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_alias()).count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.sprite_count() - self.unique_count()
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Check if any warnings were generated.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "{} sprites ({} unique, {} duplicates), {} animations, {:.1}% density",
            self.sprite_count(),
            self.unique_count(),
            self.duplicate_count(),
            self.animation_count(),
            self.metrics.density
        )
    }
}
