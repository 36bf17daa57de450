//! Build context containing configuration and settings for a build.

use crate::animation::DetectOptions;
use crate::config::SpritecConfig;
use crate::output::OutputLayout;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// All relative paths in the configuration are resolved against
/// `project_root` (the directory holding `spritec.toml`).
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The merged configuration
    config: SpritecConfig,
    /// Base directory for relative paths
    project_root: PathBuf,
    /// Run every stage but write nothing
    dry_run: bool,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: SpritecConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, dry_run: false }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SpritecConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Source image directory.
    pub fn input_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.input)
    }

    /// Directory for the atlas image and debug view.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.output)
    }

    /// Directory for the `.h`/`.c` pair, if separate.
    pub fn header_dir(&self) -> Option<PathBuf> {
        self.config.project.header_dir.as_deref().map(|dir| self.resolve_path(dir))
    }

    /// Final location of every artifact.
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_dir(), self.header_dir().as_deref())
    }

    pub fn canvas_size(&self) -> u32 {
        self.config.atlas.size
    }

    pub fn padding(&self) -> u32 {
        self.config.atlas.padding
    }

    pub fn dedup_enabled(&self) -> bool {
        self.config.build.dedup
    }

    pub fn debug_html_enabled(&self) -> bool {
        self.config.build.debug_html
    }

    /// Worker threads for decoding; `None` means one per core.
    pub fn jobs(&self) -> Option<usize> {
        self.config.build.jobs
    }

    /// Whether animation problems fail the build.
    pub fn is_strict(&self) -> bool {
        self.config.build.strict
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Animation detection settings derived from the config.
    pub fn detect_options(&self) -> DetectOptions {
        DetectOptions {
            default_speed: self.config.animation.default_speed,
            strict: self.is_strict(),
        }
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::resolve_path(&self.project_root, path)
    }
}
