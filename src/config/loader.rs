//! Configuration loading and discovery for `spritec.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::SpritecConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`find_config_from`].
pub const CONFIG_FILE: &str = "spritec.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing error
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
///
/// Paths are expected to be absolute already; relative ones would resolve
/// against the project root like config values do.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub header_dir: Option<PathBuf>,
    pub size: Option<u32>,
    pub padding: Option<u32>,
    pub dedup: Option<bool>,
    pub strict: Option<bool>,
    pub debug_html: Option<bool>,
    pub jobs: Option<usize>,
}

/// A loaded configuration and the directory its relative paths are based on.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SpritecConfig,
    /// Directory holding the config file, or the working directory
    pub root: PathBuf,
    /// Config file that was read, if any
    pub source: Option<PathBuf>,
}

/// Find `spritec.toml` by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find `spritec.toml` by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// With an explicit path the file must exist. Without one, the nearest
/// `spritec.toml` above the working directory is used, falling back to
/// [`default_config`] when there is none.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            let root = project_root(&p)
                .filter(|r| !r.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(current_dir);
            Ok(LoadedConfig { config, root, source: Some(p) })
        }
        None => Ok(LoadedConfig { config: default_config(), root: current_dir(), source: None }),
    }
}

fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Load configuration from a specific file path.
///
/// Only parse errors are reported here; validation runs after CLI overrides
/// are merged (see [`validate_config`]).
pub fn load_config_file(path: &Path) -> Result<SpritecConfig, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Turn validation findings into a [`ConfigError`].
pub fn validate_config(config: &SpritecConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Configuration used when no `spritec.toml` is found.
pub fn default_config() -> SpritecConfig {
    SpritecConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut SpritecConfig, overrides: &CliOverrides) {
    if let Some(ref input) = overrides.input {
        config.project.input = input.clone();
    }
    if let Some(ref output) = overrides.output {
        config.project.output = output.clone();
    }
    if let Some(ref header_dir) = overrides.header_dir {
        config.project.header_dir = Some(header_dir.clone());
    }
    if let Some(size) = overrides.size {
        config.atlas.size = size;
    }
    if let Some(padding) = overrides.padding {
        config.atlas.padding = padding;
    }
    if let Some(dedup) = overrides.dedup {
        config.build.dedup = dedup;
    }
    if let Some(strict) = overrides.strict {
        config.build.strict = strict;
    }
    if let Some(debug_html) = overrides.debug_html {
        config.build.debug_html = debug_html;
    }
    if let Some(jobs) = overrides.jobs {
        config.build.jobs = Some(jobs);
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
