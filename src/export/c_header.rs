//! C declarations and definitions.
//!
//! Generates the pair of files a C engine compiles against:
//!
//! ```text
//! atlas_data.h   SpriteMeta / AnimDef types, SpriteID / AnimID enums, externs
//! atlas_data.c   ASSET_SPRITES / ASSET_ANIMS array literals
//! ```
//!
//! Sprite rows are emitted for every sprite in ID order so `SpriteID` values
//! index `ASSET_SPRITES` directly. Alias rows repeat their canonical sprite's
//! data and are tagged `(DUP)` in the row comment.

use crate::export::{AtlasData, Exporter};
use crate::ident::{ANIM_PREFIX, SPRITE_PREFIX};
use crate::output::HEADER_FILE;

const RULE: &str =
    "// ---------------------------------------------------------------------------";
const BANNER: &str =
    "// ============================================================================";

fn banner(lines: &mut Vec<String>) {
    lines.push(BANNER.to_string());
    lines.push("// AUTO-GENERATED FILE - DO NOT EDIT MANUALLY".to_string());
    lines.push(format!("// Generated by spritec {}", env!("CARGO_PKG_VERSION")));
    lines.push(BANNER.to_string());
    lines.push(String::new());
}

fn section(lines: &mut Vec<String>, title: &[&str]) {
    lines.push(RULE.to_string());
    lines.extend(title.iter().map(|t| format!("// {}", t)));
    lines.push(RULE.to_string());
    lines.push(String::new());
}

fn comma(i: usize, len: usize) -> &'static str {
    if i + 1 < len {
        ","
    } else {
        ""
    }
}

/// Emits `atlas_data.h`.
#[derive(Debug, Default)]
pub struct CHeaderExporter;

impl CHeaderExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for CHeaderExporter {
    fn render(&self, data: &AtlasData<'_>) -> String {
        let mut lines = Vec::new();
        banner(&mut lines);

        lines.extend(
            ["#ifndef ATLAS_DATA_H", "#define ATLAS_DATA_H", "", "#include <stdint.h>", ""]
                .map(String::from),
        );

        section(&mut lines, &["Sprite Metadata Structure"]);
        lines.extend(
            [
                "typedef struct {",
                "    uint16_t x, y;         // Position in the atlas (clean pixels, inside extrusion)",
                "    uint16_t w, h;         // Trimmed dimensions (visible pixels to render)",
                "    uint16_t offX, offY;   // Offset from original top-left (after trimming)",
                "    uint16_t origW, origH; // Original image dimensions before trimming",
                "} SpriteMeta;",
                "",
            ]
            .map(String::from),
        );

        section(&mut lines, &["Animation Definition Structure"]);
        lines.extend(
            [
                "typedef struct {",
                "    uint16_t startSpriteID;  // ID of first frame sprite",
                "    uint16_t frameCount;     // Number of frames in animation",
                "    float defaultSpeed;      // Seconds per frame",
                "    uint8_t loop;            // Whether animation loops (1=yes, 0=no)",
                "} AnimDef;",
                "",
            ]
            .map(String::from),
        );

        section(&mut lines, &["Sprite ID Enumeration"]);
        lines.push(format!("#define SPRITE_COUNT {}", data.records.len()));
        lines.push(format!("#define ANIM_COUNT {}", data.animations.len()));
        lines.push(String::new());
        lines.push("typedef enum {".to_string());
        for (i, record) in data.records.iter().enumerate() {
            lines.push(format!("    {} = {}{}", record.symbol, i, comma(i, data.records.len())));
        }
        lines.push("} SpriteID;".to_string());
        lines.push(String::new());

        if !data.animations.is_empty() {
            section(&mut lines, &["Animation ID Enumeration"]);
            lines.push("typedef enum {".to_string());
            for (i, anim) in data.animations.iter().enumerate() {
                lines.push(format!("    {} = {}{}", anim.symbol, i, comma(i, data.animations.len())));
            }
            lines.push("} AnimID;".to_string());
            lines.push(String::new());
        }

        section(&mut lines, &["External Data Arrays (defined in atlas_data.c)"]);
        lines.push("extern const SpriteMeta ASSET_SPRITES[SPRITE_COUNT];".to_string());
        if !data.animations.is_empty() {
            lines.push("extern const AnimDef ASSET_ANIMS[ANIM_COUNT];".to_string());
        }
        lines.push(String::new());
        lines.push("#endif // ATLAS_DATA_H".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Emits `atlas_data.c`.
#[derive(Debug, Default)]
pub struct CSourceExporter;

impl CSourceExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for CSourceExporter {
    fn render(&self, data: &AtlasData<'_>) -> String {
        let mut lines = Vec::new();
        banner(&mut lines);
        lines.push(format!("#include \"{}\"", HEADER_FILE));
        lines.push(String::new());

        section(
            &mut lines,
            &[
                "Sprite Metadata Array",
                "Format: { x, y, w, h, offX, offY, origW, origH }",
                "Note: x, y point to clean pixels (inside the extruded border)",
                "Note: w, h are the trimmed dimensions (visible pixels to render)",
            ],
        );
        lines.push("const SpriteMeta ASSET_SPRITES[SPRITE_COUNT] = {".to_string());
        let count = data.records.len();
        for (i, (record, meta)) in data.records.iter().zip(&data.sprite_meta).enumerate() {
            let name = record.symbol.strip_prefix(SPRITE_PREFIX).unwrap_or(&record.symbol);
            let dup = if record.is_alias() { " (DUP)" } else { "" };
            lines.push(format!(
                "    /* [{:3}] {}{:<30}{:<6} */ {{ {:4}, {:4}, {:4}, {:4}, {:3}, {:3}, {:4}, {:4} }}{}",
                i,
                SPRITE_PREFIX,
                name,
                dup,
                meta.x,
                meta.y,
                meta.w,
                meta.h,
                meta.off_x,
                meta.off_y,
                meta.orig_w,
                meta.orig_h,
                comma(i, count)
            ));
        }
        lines.push("};".to_string());
        lines.push(String::new());

        if !data.animations.is_empty() {
            section(
                &mut lines,
                &["Animation Definitions Array", "Format: { startSpriteID, frameCount, defaultSpeed, loop }"],
            );
            lines.push("const AnimDef ASSET_ANIMS[ANIM_COUNT] = {".to_string());
            let count = data.animations.len();
            for (i, (anim, def)) in data.animations.iter().zip(&data.anim_defs).enumerate() {
                let name = anim.symbol.strip_prefix(ANIM_PREFIX).unwrap_or(&anim.symbol);
                lines.push(format!(
                    "    /* [{:2}] {}{:<25} */ {{ {:3}, {:2}, {:.2}f, {} }}{}",
                    i,
                    ANIM_PREFIX,
                    name,
                    def.start,
                    def.frame_count,
                    def.default_speed,
                    u8::from(def.looping),
                    comma(i, count)
                ));
            }
            lines.push("};".to_string());
        }
        lines.push(String::new());

        lines.join("\n")
    }
}
