//! Configuration schema types for `spritec.toml`
//!
//! Every section and field is optional; a missing file or an empty one gives
//! the same defaults as the command line.

use crate::atlas::SUPPORTED_SIZES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input/output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding the source images
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Directory for the atlas image and debug view
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Separate directory for the `.h`/`.c` pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_dir: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { input: default_input(), output: default_output(), header_dir: None }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("assets/raw_textures")
}

fn default_output() -> PathBuf {
    PathBuf::from("assets/build")
}

/// Canvas settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasSection {
    /// Square canvas edge length
    #[serde(default = "default_size")]
    pub size: u32,
    /// Gap after every tile
    #[serde(default = "default_padding")]
    pub padding: u32,
}

impl Default for AtlasSection {
    fn default() -> Self {
        Self { size: default_size(), padding: default_padding() }
    }
}

fn default_size() -> u32 {
    4096
}

fn default_padding() -> u32 {
    2
}

/// Pipeline switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSection {
    /// Share one tile between identical sprites
    #[serde(default = "default_true")]
    pub dedup: bool,
    /// Animation problems fail the build
    #[serde(default = "default_true")]
    pub strict: bool,
    /// Emit `atlas_debug.html`
    #[serde(default = "default_true")]
    pub debug_html: bool,
    /// Decoder threads; all cores when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self { dedup: true, strict: true, debug_html: true, jobs: None }
    }
}

fn default_true() -> bool {
    true
}

/// Animation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSection {
    /// Seconds per frame
    #[serde(default = "default_speed")]
    pub default_speed: f32,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self { default_speed: default_speed() }
    }
}

fn default_speed() -> f32 {
    crate::animation::DEFAULT_SPEED
}

/// Density advisory thresholds, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSection {
    #[serde(default = "default_warn_density")]
    pub warn_density: f64,
    #[serde(default = "default_info_density")]
    pub info_density: f64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { warn_density: default_warn_density(), info_density: default_info_density() }
    }
}

fn default_warn_density() -> f64 {
    90.0
}

fn default_info_density() -> f64 {
    75.0
}

/// Complete `spritec.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpritecConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub atlas: AtlasSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub animation: AnimationSection,
    #[serde(default)]
    pub metrics: MetricsSection,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "atlas.size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

impl SpritecConfig {
    /// Validate the configuration and return every error found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: field.to_string(), message });
        };

        if !SUPPORTED_SIZES.contains(&self.atlas.size) {
            push(
                "atlas.size",
                format!(
                    "must be one of {} (got {})",
                    SUPPORTED_SIZES.map(|s| s.to_string()).join(", "),
                    self.atlas.size
                ),
            );
        }

        if self.atlas.padding >= self.atlas.size {
            push("atlas.padding", format!("must be smaller than atlas.size ({})", self.atlas.size));
        }

        let speed = self.animation.default_speed;
        if !speed.is_finite() || speed <= 0.0 {
            push("animation.default_speed", "must be a positive number".to_string());
        }

        let warn = self.metrics.warn_density;
        let info = self.metrics.info_density;
        if !(0.0..=100.0).contains(&warn) {
            push("metrics.warn_density", "must be between 0 and 100".to_string());
        }
        if !(0.0..=100.0).contains(&info) {
            push("metrics.info_density", "must be between 0 and 100".to_string());
        }
        if info > warn {
            push("metrics.info_density", "must not exceed metrics.warn_density".to_string());
        }

        if self.build.jobs == Some(0) {
            push("build.jobs", "must be a positive integer".to_string());
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
