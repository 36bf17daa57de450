//! Output files: PNG encoding, layout and writing
//!
//! Everything is rendered into memory first. Files are only written once every
//! artifact of the build exists, so a failure never leaves half an output set.

use crate::sprite::SpriteId;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Atlas image file name.
pub const ATLAS_IMAGE: &str = "atlas.png";
/// Declarations file name.
pub const HEADER_FILE: &str = "atlas_data.h";
/// Definitions file name.
pub const SOURCE_FILE: &str = "atlas_data.c";
/// Debug overlay file name.
pub const DEBUG_HTML: &str = "atlas_debug.html";

/// Error producing or writing output artifacts
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    /// IO error while creating a directory or writing a file
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// PNG encoding failed
    #[error("Failed to encode atlas image: {0}")]
    Image(#[from] image::ImageError),
    /// A metadata value does not fit its 16-bit field
    #[error("{symbol}: {field} = {value} does not fit in a 16-bit field")]
    FieldOverflow { symbol: String, field: &'static str, value: u64 },
    /// An alias points at a sprite that does not own a tile
    #[error("{symbol}: alias of sprite {of} does not resolve to a packed sprite")]
    UnresolvedAlias { symbol: String, of: SpriteId },
}

/// Where each artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub atlas: PathBuf,
    pub header: PathBuf,
    pub source: PathBuf,
    pub debug_html: PathBuf,
}

impl OutputLayout {
    /// Image and debug view go to `output_dir`; the two data files go to
    /// `header_dir` when given, `output_dir` otherwise.
    pub fn new(output_dir: &Path, header_dir: Option<&Path>) -> Self {
        let data_dir = header_dir.unwrap_or(output_dir);
        Self {
            atlas: output_dir.join(ATLAS_IMAGE),
            header: data_dir.join(HEADER_FILE),
            source: data_dir.join(SOURCE_FILE),
            debug_html: output_dir.join(DEBUG_HTML),
        }
    }
}

/// A fully rendered artifact waiting to be written.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl OutputFile {
    pub fn new(path: PathBuf, contents: impl Into<Vec<u8>>) -> Self {
        Self { path, contents: contents.into() }
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, OutputError> {
    use image::ImageEncoder;

    let mut png_data = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_data).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(png_data)
}

/// Write one file, creating its parent directory if needed.
pub fn write_file(file: &OutputFile) -> Result<(), OutputError> {
    if let Some(parent) = file.path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|source| OutputError::Io { path: parent.to_path_buf(), source })?;
        }
    }
    std::fs::write(&file.path, &file.contents)
        .map_err(|source| OutputError::Io { path: file.path.clone(), source })
}
