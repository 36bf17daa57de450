//! Pipeline Test Suite
//!
//! End-to-end tests for the spritec build pipeline. Every test builds a
//! throwaway project in a temporary directory, generates its source PNGs with
//! `image`, and runs the real pipeline against it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use image::{Rgba, RgbaImage};
use spritec::build::progress::{
    ConsoleProgress, JsonProgress, MemoryProgress, NullProgress, ProgressEvent,
};
use spritec::build::{BuildContext, BuildError, BuildOutcome, BuildPipeline, BuildReport};
use spritec::config::{default_config, SpritecConfig};
use spritec::sprite::{SpriteId, SpriteKind};
use spritec::validate::IssueType;

// ============================================================================
// Test Utilities
// ============================================================================

/// Project with `raw/` as input and `build/` as output.
struct Project {
    temp: TempDir,
    config: SpritecConfig,
}

impl Project {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("raw")).unwrap();

        let mut config = default_config();
        config.project.input = PathBuf::from("raw");
        config.project.output = PathBuf::from("build");
        config.atlas.size = 256;
        Self { temp, config }
    }

    fn raw(&self) -> PathBuf {
        self.temp.path().join("raw")
    }

    fn out(&self, name: &str) -> PathBuf {
        self.temp.path().join("build").join(name)
    }

    fn add(&self, name: &str, image: &RgbaImage) {
        image.save(self.raw().join(name)).unwrap();
    }

    fn context(&self) -> BuildContext {
        BuildContext::new(self.config.clone(), self.temp.path().to_path_buf())
    }

    fn run(&self) -> Result<BuildOutcome, BuildError> {
        BuildPipeline::new(self.context()).run(&NullProgress::new())
    }

    fn build(&self) -> BuildReport {
        match self.run() {
            Ok(BuildOutcome::Built(report)) => report,
            other => panic!("expected a built atlas, got {:?}", other),
        }
    }

    fn output_files(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.temp.path().join("build")) else {
            return vec![];
        };
        let mut names: Vec<String> =
            entries.map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
        names.sort();
        names
    }
}

fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(color))
}

/// Values of the `ASSET_SPRITES` row for `symbol`, e.g. `{ 3, 3, 4, 4, ... }`.
fn sprite_row(source: &str, symbol: &str) -> String {
    let needle = format!("{} ", symbol);
    let line = source
        .lines()
        .find(|l| l.contains(&needle) && l.contains("*/"))
        .unwrap_or_else(|| panic!("no row for {}", symbol));
    let (_, values) = line.split_once("*/").unwrap();
    values.trim().trim_end_matches(',').to_string()
}

/// Test writer for capturing output.
struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// End-to-end Scenarios
// ============================================================================

#[test]
fn test_scenario_a_simple_animation() {
    let project = Project::new();
    project.add("idle_0.png", &solid(4, 4, [255, 0, 0, 255]));
    project.add("idle_1.png", &solid(4, 4, [0, 255, 0, 255]));
    project.add("idle_2.png", &solid(4, 4, [0, 0, 255, 255]));

    let report = project.build();
    assert_eq!(report.animations.len(), 1);
    let anim = &report.animations[0];
    assert_eq!(anim.name, "idle");
    assert_eq!(anim.start, SpriteId(0));
    assert_eq!(anim.frame_count, 3);
    assert!(report.warnings.is_empty());

    let header = fs::read_to_string(project.out("atlas_data.h")).unwrap();
    assert!(header.contains("#define SPRITE_COUNT 3"));
    assert!(header.contains("ANIM_IDLE = 0"));

    let source = fs::read_to_string(project.out("atlas_data.c")).unwrap();
    assert!(source.contains("{   0,  3, 0.10f, 1 }"));
}

#[test]
fn test_scenario_b_missing_frame_aborts() {
    let project = Project::new();
    project.add("a_0.png", &solid(4, 4, [255, 0, 0, 255]));
    project.add("a_2.png", &solid(4, 4, [0, 255, 0, 255]));

    match project.run() {
        Err(BuildError::Validation(issues)) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].issue_type, IssueType::MissingFrames);
            assert!(issues[0].message.contains("[1]"));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert!(project.output_files().is_empty());
}

#[test]
fn test_scenario_c_duplicate_becomes_alias() {
    let project = Project::new();
    let mut image = solid(6, 5, [200, 100, 50, 255]);
    image.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
    project.add("hero.png", &image);
    project.add("hero_copy.png", &image);

    let report = project.build();
    assert_eq!(report.records[1].kind, SpriteKind::Alias { of: SpriteId(0) });
    assert_eq!(report.unique_count(), 1);
    assert_eq!(report.duplicate_count(), 1);

    let source = fs::read_to_string(project.out("atlas_data.c")).unwrap();
    assert_eq!(sprite_row(&source, "SPR_HERO"), sprite_row(&source, "SPR_HERO_COPY"));
    assert!(source.contains("(DUP)"));
}

#[test]
fn test_scenario_d_capacity_error_writes_nothing() {
    let mut project = Project::new();
    project.config.atlas.size = 256;
    project.add("big_a.png", &solid(200, 200, [255, 0, 0, 255]));
    project.add("big_b.png", &solid(200, 200, [0, 255, 0, 255]));
    project.add("big_c.png", &solid(200, 200, [0, 0, 255, 255]));

    match project.run() {
        Err(BuildError::Capacity(err)) => {
            let message = err.to_string();
            assert!(message.contains("big_b (202x202)"));
            assert!(message.contains("big_c (202x202)"));
            assert!(message.contains("256x256"));
        }
        other => panic!("expected capacity failure, got {:?}", other),
    }
    assert!(project.output_files().is_empty());
}

#[test]
fn test_scenario_e_symbol_collision_names_both_sources() {
    let project = Project::new();
    project.add("Orc-1.png", &solid(4, 4, [255, 0, 0, 255]));
    project.add("orc_1.png", &solid(4, 4, [0, 255, 0, 255]));

    match project.run() {
        Err(BuildError::Validation(issues)) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].issue_type, IssueType::SymbolCollision);
            assert_eq!(issues[0].subject, "SPR_ORC_1");
            let names: Vec<String> = issues[0]
                .sources
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect();
            assert_eq!(names, vec!["Orc-1.png", "orc_1.png"]);
        }
        other => panic!("expected collision failure, got {:?}", other),
    }
    assert!(project.output_files().is_empty());
}

// ============================================================================
// Pipeline Behavior
// ============================================================================

#[test]
fn test_atlas_pixels_match_metadata() {
    let project = Project::new();
    let mut image = RgbaImage::new(10, 10);
    for y in 3..7 {
        for x in 2..5 {
            image.put_pixel(x, y, Rgba([x as u8 * 10, y as u8 * 10, 99, 255]));
        }
    }
    project.add("gem.png", &image);

    let report = project.build();
    let record = &report.records[0];
    assert_eq!((record.trim.offset.x, record.trim.offset.y), (2, 3));
    let pos = record.atlas_pos().unwrap();

    let atlas = image::open(project.out("atlas.png")).unwrap().to_rgba8();
    assert_eq!(atlas.dimensions(), (256, 256));
    // Clean region starts one pixel inside the extruded tile.
    assert_eq!(*atlas.get_pixel(pos.x + 1, pos.y + 1), *image.get_pixel(2, 3));
    // Border replicates the nearest edge pixel.
    assert_eq!(*atlas.get_pixel(pos.x, pos.y), *image.get_pixel(2, 3));
    assert_eq!(atlas.get_pixel(0, 0)[3], 0);

    let source = fs::read_to_string(project.out("atlas_data.c")).unwrap();
    let expected = format!(
        "{{ {:4}, {:4},    3,    4,   2,   3,   10,   10 }}",
        pos.x + 1,
        pos.y + 1
    );
    assert_eq!(sprite_row(&source, "SPR_GEM"), expected);
}

#[test]
fn test_fully_transparent_sprite_gets_placeholder() {
    let project = Project::new();
    project.add("empty.png", &solid(16, 16, [255, 255, 255, 0]));

    let report = project.build();
    let trim = report.records[0].trim;
    assert_eq!((trim.trimmed.w, trim.trimmed.h), (1, 1));
    assert_eq!((trim.offset.x, trim.offset.y), (0, 0));
    assert_eq!((trim.original.w, trim.original.h), (16, 16));
}

#[test]
fn test_all_outputs_written() {
    let project = Project::new();
    project.add("tree.png", &solid(8, 8, [0, 128, 0, 255]));

    let report = project.build();
    assert_eq!(report.outputs.len(), 4);
    assert_eq!(
        project.output_files(),
        vec!["atlas.png", "atlas_data.c", "atlas_data.h", "atlas_debug.html"]
    );

    let html = fs::read_to_string(project.out("atlas_debug.html")).unwrap();
    assert!(html.contains("atlas.png"));
}

#[test]
fn test_debug_html_can_be_disabled() {
    let mut project = Project::new();
    project.config.build.debug_html = false;
    project.add("tree.png", &solid(8, 8, [0, 128, 0, 255]));

    project.build();
    assert_eq!(project.output_files(), vec!["atlas.png", "atlas_data.c", "atlas_data.h"]);
}

#[test]
fn test_header_dir_receives_data_files() {
    let mut project = Project::new();
    project.config.project.header_dir = Some(PathBuf::from("engine/gen"));
    project.add("tree.png", &solid(8, 8, [0, 128, 0, 255]));

    project.build();
    let gen = project.temp.path().join("engine/gen");
    assert!(gen.join("atlas_data.h").is_file());
    assert!(gen.join("atlas_data.c").is_file());
    assert_eq!(project.output_files(), vec!["atlas.png", "atlas_debug.html"]);
}

#[test]
fn test_dry_run_writes_nothing() {
    let project = Project::new();
    project.add("tree.png", &solid(8, 8, [0, 128, 0, 255]));

    let outcome = BuildPipeline::new(project.context().with_dry_run(true))
        .run(&NullProgress::new())
        .unwrap();
    let report = outcome.report().unwrap();
    assert!(report.dry_run);
    assert_eq!(report.outputs.len(), 4);
    assert!(project.output_files().is_empty());
}

#[test]
fn test_no_input_is_a_no_op() {
    let project = Project::new();
    fs::write(project.raw().join("notes.txt"), "not a sprite").unwrap();

    let reporter = MemoryProgress::new();
    let outcome = BuildPipeline::new(project.context()).run(&reporter).unwrap();
    assert!(outcome.is_no_input());
    assert!(project.output_files().is_empty());
    assert!(reporter.events().iter().any(|e| matches!(
        e,
        ProgressEvent::Info { message } if message.contains("No PNG files")
    )));
}

#[test]
fn test_missing_input_dir_fails() {
    let mut project = Project::new();
    project.config.project.input = PathBuf::from("does/not/exist");
    assert!(matches!(project.run(), Err(BuildError::Discovery(_))));
}

#[test]
fn test_undecodable_image_fails() {
    let project = Project::new();
    project.add("good.png", &solid(4, 4, [1, 1, 1, 255]));
    fs::write(project.raw().join("bad.png"), b"not really a png").unwrap();

    assert!(matches!(project.run(), Err(BuildError::Load(_))));
    assert!(project.output_files().is_empty());
}

#[test]
fn test_lenient_mode_downgrades_animation_errors() {
    let mut project = Project::new();
    project.config.build.strict = false;
    project.add("a_0.png", &solid(4, 4, [255, 0, 0, 255]));
    project.add("a_2.png", &solid(4, 4, [0, 255, 0, 255]));
    project.add("walk_0.png", &solid(4, 4, [0, 0, 255, 255]));
    project.add("walk_1.png", &solid(4, 4, [0, 0, 128, 255]));

    let reporter = MemoryProgress::new();
    let outcome = BuildPipeline::new(project.context()).run(&reporter).unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.animations.len(), 1);
    assert_eq!(report.animations[0].name, "walk");
    assert_eq!(report.animations[0].start, SpriteId(2));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("missing_frames"));
    assert_eq!(reporter.warnings().len(), 1);
}

#[test]
fn test_dedup_disabled_packs_every_sprite() {
    let mut project = Project::new();
    project.config.build.dedup = false;
    let image = solid(4, 4, [9, 9, 9, 255]);
    project.add("a.png", &image);
    project.add("b.png", &image);

    let report = project.build();
    assert_eq!(report.unique_count(), 2);
    assert!(report.records.iter().all(|r| !r.is_alias()));
}

#[test]
fn test_sprite_ids_follow_sorted_names() {
    let project = Project::new();
    project.add("zebra.png", &solid(4, 4, [1, 0, 0, 255]));
    project.add("apple.png", &solid(4, 4, [2, 0, 0, 255]));
    project.add("mango.png", &solid(4, 4, [3, 0, 0, 255]));

    let report = project.build();
    let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["apple", "mango", "zebra"]);

    let header = fs::read_to_string(project.out("atlas_data.h")).unwrap();
    let apple = header.find("SPR_APPLE").unwrap();
    let zebra = header.find("SPR_ZEBRA").unwrap();
    assert!(apple < zebra);
}

// ============================================================================
// Progress Reporting
// ============================================================================

#[test]
fn test_console_progress_shows_stages_and_summary() {
    let project = Project::new();
    project.add("idle_0.png", &solid(4, 4, [255, 0, 0, 255]));
    project.add("idle_1.png", &solid(4, 4, [255, 0, 0, 255]));

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let reporter = ConsoleProgress::with_output(TestWriter(buffer.clone())).with_verbose(true);
    BuildPipeline::new(project.context()).run(&reporter).unwrap();

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(output.contains("[1/8] Scanning for images"));
    assert!(output.contains("[8/8] Writing output files"));
    assert!(output.contains("idle_1 -> idle_0"));
    assert!(output.contains("[done] 2 sprites (1 unique, 1 duplicates), 1 animations"));
}

#[test]
fn test_json_progress_emits_one_object_per_line() {
    let project = Project::new();
    project.add("tree.png", &solid(8, 8, [0, 128, 0, 255]));

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let reporter = JsonProgress::with_output(TestWriter(buffer.clone()));
    BuildPipeline::new(project.context().with_dry_run(true)).run(&reporter).unwrap();

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    let events: Vec<serde_json::Value> =
        output.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(events.first().unwrap()["event"], "build_started");
    assert_eq!(events.last().unwrap()["event"], "build_completed");
    assert_eq!(events.last().unwrap()["success"], true);
    assert!(events.iter().any(|e| e["event"] == "metrics"));
}

#[test]
fn test_density_warning_for_crowded_atlas() {
    let mut project = Project::new();
    project.config.atlas.padding = 0;
    // One 254x254 sprite extrudes to the full 256x256 canvas.
    project.add("full.png", &solid(254, 254, [5, 5, 5, 255]));

    let report = project.build();
    assert!((report.metrics.density - 100.0).abs() < 1e-9);
    assert!(report.warnings.iter().any(|w| w.contains("larger atlas")));
}

#[test]
fn test_relative_paths_resolve_against_project_root() {
    let project = Project::new();
    project.add("tree.png", &solid(8, 8, [0, 128, 0, 255]));

    let report = project.build();
    for output in &report.outputs {
        assert!(output.starts_with(project.temp.path()), "{} escaped root", output.display());
    }
    assert!(Path::new(&project.out("atlas.png")).is_file());
}
