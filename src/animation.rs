//! Animation detection - infer frame sequences from sprite names
//!
//! A sprite named `<base>[_]<digits>` is a frame candidate of animation `<base>`
//! (e.g. `soldier_run_00`, `player_idle1`). Candidates with two or more frames
//! are checked for gaps, repeated frame numbers and sprite ID contiguity.

use crate::ident::{anim_symbol, check_animation_symbols};
use crate::sprite::{AnimationRecord, SpriteId};
use crate::validate::{IssueType, ValidationIssue};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// Default seconds per frame.
pub const DEFAULT_SPEED: f32 = 0.1;

fn frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+?)_?([0-9]+)$").expect("frame pattern is valid"))
}

/// Split a sprite name into `(base, frame)`.
///
/// The base is the shortest prefix that leaves an optional `_` and a trailing
/// digit run. Returns `None` for names without trailing digits, or when the
/// digit run does not fit a u64.
pub fn parse_frame_name(name: &str) -> Option<(&str, u64)> {
    let caps = frame_pattern().captures(name)?;
    let base = caps.get(1)?.as_str();
    let frame = caps.get(2)?.as_str().parse().ok()?;
    Some((base, frame))
}

/// Detection settings.
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    pub default_speed: f32,
    /// Report sequence problems as errors instead of warnings
    pub strict: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self { default_speed: DEFAULT_SPEED, strict: true }
    }
}

/// Accepted animations and every issue found on the way.
#[derive(Debug, Clone, Default)]
pub struct AnimationScan {
    /// Valid animations, sorted by base name
    pub animations: Vec<AnimationRecord>,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug)]
struct Frame<'a> {
    number: u64,
    id: SpriteId,
    name: &'a str,
}

/// Group sprites into animations.
///
/// `sprites` yields `(id, name)` for every sprite, aliases included. Rejected
/// sequences are dropped from the result and reported: as errors in strict mode,
/// as warnings otherwise. Symbol collisions between accepted animations are
/// always errors.
pub fn detect_animations<'a, I>(sprites: I, options: &DetectOptions) -> AnimationScan
where
    I: IntoIterator<Item = (SpriteId, &'a str)>,
{
    let mut groups: BTreeMap<&str, Vec<Frame<'a>>> = BTreeMap::new();
    for (id, name) in sprites {
        if let Some((base, number)) = parse_frame_name(name) {
            groups.entry(base).or_default().push(Frame { number, id, name });
        }
    }

    let mut scan = AnimationScan::default();
    for (base, mut frames) in groups {
        if frames.len() < 2 {
            continue;
        }
        // Stable: equal frame numbers keep ID order.
        frames.sort_by_key(|f| f.number);

        match check_sequence(base, &frames) {
            Ok(()) => scan.animations.push(AnimationRecord {
                name: base.to_string(),
                symbol: anim_symbol(base),
                start: frames[0].id,
                frame_count: frames.len(),
                default_speed: options.default_speed,
                looping: true,
            }),
            Err((issue_type, message)) => {
                let issue = if options.strict {
                    ValidationIssue::error(issue_type, base, message)
                } else {
                    ValidationIssue::warning(issue_type, base, message)
                };
                scan.issues.push(issue);
            }
        }
    }

    scan.issues.extend(check_animation_symbols(scan.animations.iter().map(|a| a.name.as_str())));
    scan
}

/// Validate one sorted candidate sequence.
fn check_sequence(base: &str, frames: &[Frame<'_>]) -> Result<(), (IssueType, String)> {
    let numbers: Vec<u64> = frames.iter().map(|f| f.number).collect();

    let repeated: BTreeSet<u64> =
        numbers.windows(2).filter(|w| w[0] == w[1]).map(|w| w[0]).collect();
    if !repeated.is_empty() {
        return Err((
            IssueType::DuplicateFrames,
            format!(
                "Animation '{}' repeats frame number(s): {:?}. Frame names: {:?}",
                base,
                repeated.into_iter().collect::<Vec<_>>(),
                frames.iter().map(|f| f.name).collect::<Vec<_>>()
            ),
        ));
    }

    let missing: Vec<RangeInclusive<u64>> = numbers
        .windows(2)
        .filter(|w| w[1] - w[0] > 1)
        .map(|w| (w[0] + 1)..=(w[1] - 1))
        .collect();
    if !missing.is_empty() {
        return Err((
            IssueType::MissingFrames,
            format!(
                "Animation '{}' is missing frame(s): {}. Found frames: {:?}",
                base,
                format_gaps(&missing),
                numbers
            ),
        ));
    }

    let start = frames[0].id.index();
    let contiguous = frames.iter().enumerate().all(|(i, f)| f.id.index() == start + i);
    if !contiguous {
        return Err((
            IssueType::NonContiguousIds,
            format!(
                "Animation '{}' has non-consecutive sprite IDs. Frame names: {:?}, IDs: {:?}",
                base,
                frames.iter().map(|f| f.name).collect::<Vec<_>>(),
                frames.iter().map(|f| f.id.index()).collect::<Vec<_>>()
            ),
        ));
    }

    Ok(())
}

/// Render gaps as `[1, 3, 5..=9]`. Spans longer than two numbers stay
/// collapsed so the message size does not depend on the gap size.
fn format_gaps(gaps: &[RangeInclusive<u64>]) -> String {
    let parts: Vec<String> = gaps
        .iter()
        .map(|gap| match gap.end() - gap.start() {
            0 => gap.start().to_string(),
            1 => format!("{}, {}", gap.start(), gap.end()),
            _ => format!("{}..={}", gap.start(), gap.end()),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Severity;

    fn scan(names: &[&str], strict: bool) -> AnimationScan {
        let options = DetectOptions { strict, ..DetectOptions::default() };
        detect_animations(names.iter().enumerate().map(|(i, n)| (SpriteId(i), *n)), &options)
    }

    #[test]
    fn test_parse_frame_name() {
        assert_eq!(parse_frame_name("soldier_run_00"), Some(("soldier_run", 0)));
        assert_eq!(parse_frame_name("player_idle1"), Some(("player_idle", 1)));
        assert_eq!(parse_frame_name("run__3"), Some(("run_", 3)));
        assert_eq!(parse_frame_name("idle12"), Some(("idle", 12)));
        assert_eq!(parse_frame_name("tree"), None);
        assert_eq!(parse_frame_name("42"), Some(("4", 2)));
        assert_eq!(parse_frame_name("x_99999999999999999999999"), None);
    }

    #[test]
    fn test_digit_only_names_group_into_animation() {
        // "10" splits into base "1" and frame 0, a known false positive.
        let result = scan(&["10", "11", "12"], true);
        assert!(result.issues.is_empty());
        assert_eq!(result.animations.len(), 1);
        assert_eq!(result.animations[0].name, "1");
        assert_eq!(result.animations[0].frame_count, 3);
    }

    #[test]
    fn test_detects_simple_animation() {
        let result = scan(&["idle_0", "idle_1", "idle_2"], true);
        assert!(result.issues.is_empty());
        assert_eq!(result.animations.len(), 1);

        let anim = &result.animations[0];
        assert_eq!(anim.name, "idle");
        assert_eq!(anim.symbol, "ANIM_IDLE");
        assert_eq!(anim.start, SpriteId(0));
        assert_eq!(anim.frame_count, 3);
        assert!(anim.looping);
        assert!((anim.default_speed - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_single_frame_is_not_animation() {
        let result = scan(&["level2", "tree"], true);
        assert!(result.animations.is_empty());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_gap_reports_missing_frames() {
        let result = scan(&["a_0", "a_2"], true);
        assert!(result.animations.is_empty());
        assert_eq!(result.issues.len(), 1);

        let issue = &result.issues[0];
        assert_eq!(issue.issue_type, IssueType::MissingFrames);
        assert_eq!(issue.severity, Severity::Error);
        assert!(issue.message.contains("missing frame(s): [1]"));
    }

    #[test]
    fn test_large_gap_is_reported_as_range() {
        let result = scan(&["shot_0", "shot_20241018"], true);
        assert_eq!(result.issues.len(), 1);

        let message = &result.issues[0].message;
        assert!(message.contains("missing frame(s): [1..=20241017]"));
        assert!(message.len() < 200);

        let result = scan(&["x_0", "x_18446744073709551615"], true);
        assert!(result.issues[0].message.contains("[1..=18446744073709551614]"));
    }

    #[test]
    fn test_format_gaps() {
        assert_eq!(format_gaps(&[1..=1]), "[1]");
        assert_eq!(format_gaps(&[1..=2, 4..=4]), "[1, 2, 4]");
        assert_eq!(format_gaps(&[3..=3, 5..=900]), "[3, 5..=900]");
    }

    #[test]
    fn test_gap_is_warning_when_lenient() {
        let result = scan(&["a_0", "a_3", "b_0", "b_1"], false);
        assert_eq!(result.animations.len(), 1);
        assert_eq!(result.animations[0].name, "b");
        assert_eq!(result.issues[0].severity, Severity::Warning);
        assert!(result.issues[0].message.contains("[1, 2]"));
    }

    #[test]
    fn test_repeated_frame_number_rejected() {
        let result = scan(&["walk_1", "walk_01", "walk_2"], true);
        assert!(result.animations.is_empty());
        assert_eq!(result.issues[0].issue_type, IssueType::DuplicateFrames);
    }

    #[test]
    fn test_non_contiguous_ids_rejected() {
        // Lexicographic order puts frame 10 before frames 8 and 9.
        let result = scan(&["a_10", "a_8", "a_9"], true);
        assert!(result.animations.is_empty());
        assert_eq!(result.issues[0].issue_type, IssueType::NonContiguousIds);
        assert!(result.issues[0].message.contains("IDs: [1, 2, 0]"));
    }

    #[test]
    fn test_interleaved_sprite_breaks_contiguity() {
        let result = scan(&["run_0", "run_0b", "run_1"], true);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue_type, IssueType::NonContiguousIds);
    }

    #[test]
    fn test_animations_sorted_by_name() {
        let result = scan(&["b_0", "b_1", "a_0", "a_1"], false);
        let names: Vec<&str> = result.animations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        // IDs of `a` frames are 2 and 3.
        assert_eq!(result.animations[0].start, SpriteId(2));
    }

    #[test]
    fn test_animation_symbol_collision_is_error() {
        let result = scan(&["walk-l_0", "walk-l_1", "walk_l_0", "walk_l_1"], false);
        assert_eq!(result.animations.len(), 2);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue_type, IssueType::AnimationSymbolCollision);
        assert!(result.issues[0].is_error());
    }
}
