//! spritec - Library for compiling sprite images into a packed texture atlas
//!
//! This library provides functionality to:
//! - Load PNG sprites, trim transparent edges and deduplicate identical pixels
//! - Extrude tile edges and shelf-pack them onto a square canvas
//! - Detect frame-numbered animation sequences
//! - Emit C declarations/definitions and an HTML debug view for the atlas

pub mod animation;
pub mod atlas;
pub mod build;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod export;
pub mod extrude;
pub mod ident;
pub mod metrics;
pub mod output;
pub mod sprite;
pub mod trim;
pub mod validate;
