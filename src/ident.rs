//! Symbol generation and collision detection
//!
//! Sprite and animation names become C identifiers in the declarations file.
//! Two different sources that map to the same identifier must never be merged
//! silently, so every collision is reported with all of its sources.

use crate::validate::{IssueType, ValidationIssue};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Prefix for sprite enumerators.
pub const SPRITE_PREFIX: &str = "SPR_";
/// Prefix for animation enumerators.
pub const ANIM_PREFIX: &str = "ANIM_";

/// Replace non-alphanumerics with `_`, guard a leading digit, upper-case.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Full sprite symbol, e.g. `hero-idle.0` -> `SPR_HERO_IDLE_0`.
pub fn sprite_symbol(name: &str) -> String {
    format!("{}{}", SPRITE_PREFIX, sanitize(name))
}

/// Full animation symbol, e.g. `soldier_run` -> `ANIM_SOLDIER_RUN`.
pub fn anim_symbol(name: &str) -> String {
    format!("{}{}", ANIM_PREFIX, sanitize(name))
}

/// Symbols for every sprite, in input order, plus one error per collision.
///
/// `sources` yields `(name, path)` in sprite ID order.
pub fn resolve_sprite_symbols<'a, I>(sources: I) -> (Vec<String>, Vec<ValidationIssue>)
where
    I: IntoIterator<Item = (&'a str, &'a PathBuf)>,
{
    let mut symbols = Vec::new();
    let mut owners: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for (name, path) in sources {
        let symbol = sprite_symbol(name);
        owners.entry(symbol.clone()).or_default().push(path.clone());
        symbols.push(symbol);
    }

    let issues = owners
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(symbol, paths)| {
            ValidationIssue::error(
                IssueType::SymbolCollision,
                symbol.clone(),
                format!("Name collision: {} source files map to {}", paths.len(), symbol),
            )
            .with_sources(paths)
        })
        .collect();

    (symbols, issues)
}

/// Check animation base names for symbol collisions.
pub fn check_animation_symbols<'a, I>(names: I) -> Vec<ValidationIssue>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut owners: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for name in names {
        owners.entry(anim_symbol(name)).or_default().push(name);
    }

    owners
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(symbol, names)| {
            ValidationIssue::error(
                IssueType::AnimationSymbolCollision,
                symbol.clone(),
                format!("Animation name collision: {} all map to {}", names.join(", "), symbol),
            )
        })
        .collect()
}
