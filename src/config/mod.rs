//! Configuration module for spritec
//!
//! Provides types, parsing and discovery for `spritec.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
