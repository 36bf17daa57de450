//! Build pipeline module for spritec
//!
//! Turns a directory of PNG sprites into an atlas image plus metadata.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: Find the `.png` files of the input directory, sorted by name
//! - **Processing**: Trim, check identifiers, deduplicate, extrude, pack and
//!   detect animations
//! - **Output**: Render every artifact in memory, then write them
//!
//! # Example
//!
//! ```ignore
//! use spritec::build::{BuildContext, BuildPipeline};
//! use spritec::build::progress::ConsoleProgress;
//! use spritec::config::load_config;
//!
//! let loaded = load_config(None)?;
//! let context = BuildContext::new(loaded.config, loaded.root);
//! let outcome = BuildPipeline::new(context).run(&ConsoleProgress::new())?;
//! if let Some(report) = outcome.report() {
//!     println!("{}", report.summary());
//! }
//! ```

pub mod context;
pub mod discovery;
pub mod pipeline;
pub mod progress;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use pipeline::*;
pub use result::*;
