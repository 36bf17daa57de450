//! Interactive debug overlay for the atlas image.
//!
//! Renders a standalone HTML page that shows `atlas.png` with one box per
//! canonical sprite over its clean region, and an optional dashed box over the
//! full extruded tile. Coordinates come from the same table as the C
//! definitions, so what the page shows is what the engine reads.

use crate::export::{AtlasData, Exporter};
use crate::extrude::EXTRUDE;
use crate::output::ATLAS_IMAGE;

/// Emits `atlas_debug.html`.
#[derive(Debug, Default)]
pub struct DebugHtmlExporter;

impl DebugHtmlExporter {
    pub fn new() -> Self {
        Self
    }
}

/// Escape text for use inside an HTML attribute or element.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            background: #1a1a2e;
            color: #eee;
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            padding: 20px;
        }
        h1 {
            margin-bottom: 10px;
            color: #00d4ff;
        }
        .controls {
            margin-bottom: 20px;
            padding: 15px;
            background: #16213e;
            border-radius: 8px;
        }
        .controls label {
            margin-right: 20px;
            cursor: pointer;
        }
        .stats {
            margin-bottom: 20px;
            padding: 10px 15px;
            background: #0f3460;
            border-radius: 8px;
            display: inline-block;
        }
        .atlas-container {
            position: relative;
            display: inline-block;
            background: repeating-conic-gradient(#333 0% 25%, #222 0% 50%) 50% / 20px 20px;
            border: 2px solid #00d4ff;
            overflow: auto;
            max-width: 100%;
            max-height: 80vh;
        }
        .atlas-wrapper, .atlas-image {
            position: relative;
            image-rendering: pixelated;
        }
        .atlas-image {
            position: absolute;
            top: 0;
            left: 0;
        }
        .sprite-box {
            position: absolute;
            cursor: pointer;
            display: flex;
            align-items: center;
            justify-content: center;
            background: rgba(255, 0, 0, 0.3);
            border: 1px solid rgba(255, 0, 0, 0.8);
        }
        .sprite-box:hover {
            background: rgba(0, 255, 0, 0.5);
            border-color: rgba(0, 255, 0, 1);
            z-index: 1000;
        }
        .sprite-box .label {
            font-size: 9px;
            color: white;
            text-shadow: 1px 1px 1px black, -1px -1px 1px black;
            pointer-events: none;
            opacity: 0;
        }
        .show-labels .sprite-box .label {
            opacity: 1;
        }
        .extruded-box {
            position: absolute;
            border: 1px dashed rgba(0, 200, 255, 0.4);
            pointer-events: none;
            display: none;
        }
        .show-extrusion .extruded-box {
            display: block;
        }
        .hide-boxes .sprite-box {
            display: none;
        }"#;

const SCRIPT: &str = r#"        function toggleClass(className, add) {
            const wrapper = document.getElementById('atlasWrapper');
            wrapper.classList.toggle(className, add);
        }"#;

impl Exporter for DebugHtmlExporter {
    fn render(&self, data: &AtlasData<'_>) -> String {
        let size = data.canvas;
        let mut sprite_boxes = Vec::new();
        let mut extruded_boxes = Vec::new();

        for (record, meta) in data.records.iter().zip(&data.sprite_meta) {
            if record.is_alias() {
                continue;
            }
            sprite_boxes.push(format!(
                "        <div class=\"sprite-box\" style=\"left: {x}px; top: {y}px; width: {w}px; height: {h}px;\"\n             title=\"{name} (ID: {id})&#10;Atlas: ({x}, {y})&#10;Size: {w}x{h}&#10;Offset: ({ox}, {oy})&#10;Original: {ow}x{oh}\">\n            <span class=\"label\">{id}</span>\n        </div>",
                x = meta.x,
                y = meta.y,
                w = meta.w,
                h = meta.h,
                name = escape(&record.name),
                id = record.id,
                ox = meta.off_x,
                oy = meta.off_y,
                ow = meta.orig_w,
                oh = meta.orig_h,
            ));
            extruded_boxes.push(format!(
                "        <div class=\"extruded-box\" style=\"left: {}px; top: {}px; width: {}px; height: {}px;\"></div>",
                u32::from(meta.x) - EXTRUDE,
                u32::from(meta.y) - EXTRUDE,
                u32::from(meta.w) + 2 * EXTRUDE,
                u32::from(meta.h) + 2 * EXTRUDE,
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Atlas Debug View - spritec</title>
    <style>
{style}
        .atlas-wrapper, .atlas-image {{
            width: {size}px;
            height: {size}px;
        }}
    </style>
</head>
<body>
    <h1>Atlas Debug View</h1>

    <div class="stats">
        <strong>Sprites:</strong> {unique} unique, {dups} duplicates |
        <strong>Animations:</strong> {anims} |
        <strong>Atlas:</strong> {size}x{size}px
    </div>

    <div class="controls">
        <label>
            <input type="checkbox" id="toggleBoxes" checked onchange="toggleClass('hide-boxes', !this.checked)">
            Show Sprite Boxes
        </label>
        <label>
            <input type="checkbox" id="toggleLabels" onchange="toggleClass('show-labels', this.checked)">
            Show ID Labels
        </label>
        <label>
            <input type="checkbox" id="toggleExtrusion" onchange="toggleClass('show-extrusion', this.checked)">
            Show Extrusion Borders
        </label>
    </div>

    <div class="atlas-container">
        <div class="atlas-wrapper" id="atlasWrapper">
            <img src="{image}" alt="Texture Atlas" class="atlas-image">

            <!-- Extruded tiles -->
{extruded}

            <!-- Clean sprite regions -->
{sprites}
        </div>
    </div>

    <script>
{script}
    </script>
</body>
</html>
"#,
            style = STYLE,
            size = size,
            unique = data.unique_count(),
            dups = data.duplicate_count(),
            anims = data.animations.len(),
            image = ATLAS_IMAGE,
            extruded = extruded_boxes.join("\n"),
            sprites = sprite_boxes.join("\n"),
            script = SCRIPT,
        )
    }
}
