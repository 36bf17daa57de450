//! Build pipeline orchestration.
//!
//! Runs the eight stages in order: scan, load/trim, identifier check, dedup,
//! extrude, pack, animation detection, write. Each stage consumes the complete
//! result of the previous one. Every artifact is rendered in memory before the
//! first file is written, so a failing build leaves no partial output.

use crate::animation::detect_animations;
use crate::atlas::{compose_atlas, pack_tiles, PackError, PackItem, Placement};
use crate::build::discovery::{discover_sprites, DiscoveryError};
use crate::build::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::build::{BuildContext, BuildOutcome, BuildReport};
use crate::dedup::{deduplicate, Dedup};
use crate::export::{AtlasData, CHeaderExporter, CSourceExporter, DebugHtmlExporter, Exporter};
use crate::extrude::extrude;
use crate::ident::resolve_sprite_symbols;
use crate::metrics::{self, AtlasMetrics, DensityLevel};
use crate::output::{encode_png, write_file, OutputError, OutputFile};
use crate::sprite::{Point, Size, SpriteId, SpriteKind, SpriteRecord, TrimInfo};
use crate::trim::{load_sprite, LoadError, LoadedSprite};
use crate::validate::{partition, ValidationIssue};
use image::RgbaImage;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Error during build execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Input directory problem
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// A source image could not be read
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Identifier or animation validation failed; holds every error found
    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
    /// Sprites do not fit the canvas
    #[error(transparent)]
    Capacity(#[from] PackError),
    /// Rendering or writing an artifact failed
    #[error(transparent)]
    Output(#[from] OutputError),
    /// Worker pool could not be created
    #[error("Failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-sprite data that survives after the pixels are extruded.
#[derive(Debug, Clone)]
struct SpriteSource {
    name: String,
    path: PathBuf,
    trim: TrimInfo,
    hash: String,
}

/// Build pipeline for producing one atlas.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
}

impl BuildPipeline {
    /// Create a new build pipeline.
    pub fn new(context: BuildContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Run every stage, reporting progress to `reporter`.
    ///
    /// Fatal conditions are reported as an `Error` event and returned.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<BuildOutcome, BuildError> {
        let start = Instant::now();
        let result = self.execute(reporter, start);

        if let Err(e) = &result {
            reporter.report(ProgressEvent::Error { message: e.to_string() });
            reporter.report(ProgressEvent::BuildCompleted {
                success: false,
                duration_ms: start.elapsed().as_millis() as u64,
                sprites: 0,
                unique: 0,
                duplicates: 0,
                animations: 0,
                dry_run: self.context.is_dry_run(),
            });
        }
        result
    }

    fn execute(
        &self,
        reporter: &dyn ProgressReporter,
        start: Instant,
    ) -> Result<BuildOutcome, BuildError> {
        let ctx = &self.context;
        let input = ctx.input_dir();

        reporter.report(ProgressEvent::BuildStarted {
            input: input.clone(),
            output: ctx.output_dir(),
            canvas: ctx.canvas_size(),
            padding: ctx.padding(),
            dedup: ctx.dedup_enabled(),
            strict: ctx.is_strict(),
        });

        // [1/8] scan
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Scan });
        let files = discover_sprites(&input)?;
        if files.is_empty() {
            reporter.report(ProgressEvent::Info {
                message: format!("No PNG files to process in {}", input.display()),
            });
            return Ok(BuildOutcome::NoInput { input });
        }
        complete(reporter, Stage::Scan, format!("Found {} PNG files", files.len()));

        let pool = thread_pool(ctx.jobs())?;

        // [2/8] load and trim
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Load });
        let loaded: Vec<LoadedSprite> = pool.install(|| {
            files.par_iter().map(|path| load_sprite(path)).collect::<Result<Vec<_>, _>>()
        })?;
        if reporter.is_verbose() {
            for (index, sprite) in loaded.iter().enumerate() {
                reporter.report(ProgressEvent::SpriteProcessed {
                    id: SpriteId(index),
                    name: sprite.name.clone(),
                    original: sprite.trim.original,
                    trimmed: sprite.trim.trimmed,
                    offset: sprite.trim.offset,
                });
            }
        }
        let (original_px, trimmed_px, savings) =
            metrics::trim_savings(loaded.iter().map(|s| &s.trim));
        complete(
            reporter,
            Stage::Load,
            format!(
                "Loaded {} sprites, trim saved {:.1}% ({} -> {} px)",
                loaded.len(),
                savings,
                original_px,
                trimmed_px
            ),
        );

        let (sources, images): (Vec<SpriteSource>, Vec<RgbaImage>) = loaded
            .into_iter()
            .map(|s| {
                let source = SpriteSource { name: s.name, path: s.path, trim: s.trim, hash: s.hash };
                (source, s.image)
            })
            .unzip();

        // [3/8] identifiers
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Identifiers });
        let (symbols, collisions) =
            resolve_sprite_symbols(sources.iter().map(|s| (s.name.as_str(), &s.path)));
        fail_on_errors(reporter, collisions)?;
        complete(reporter, Stage::Identifiers, format!("{} symbols, no collisions", symbols.len()));

        // [4/8] dedup
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Dedup });
        let dedup = if ctx.dedup_enabled() {
            deduplicate(&sources.iter().map(|s| s.hash.as_str()).collect::<Vec<_>>())
        } else {
            Dedup::disabled(sources.len())
        };
        for (index, alias) in dedup.alias_of.iter().enumerate() {
            if let Some(of) = alias {
                reporter.report(ProgressEvent::Alias {
                    id: SpriteId(index),
                    name: sources[index].name.clone(),
                    of: *of,
                    of_name: sources[of.index()].name.clone(),
                });
            }
        }
        let dedup_detail = if ctx.dedup_enabled() {
            format!("{} unique, {} duplicates", dedup.canonical.len(), dedup.duplicates)
        } else {
            "Deduplication disabled".to_string()
        };
        complete(reporter, Stage::Dedup, dedup_detail);

        // [5/8] extrude canonical sprites only
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Extrude });
        let tiles = extrude_canonical(&pool, images, &dedup);
        complete(reporter, Stage::Extrude, format!("Extruded {} tiles", tiles.len()));

        // [6/8] pack
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Pack });
        let items: Vec<PackItem> = dedup
            .canonical
            .iter()
            .zip(&tiles)
            .map(|(id, tile)| PackItem {
                id: *id,
                name: sources[id.index()].name.clone(),
                size: Size::new(tile.width(), tile.height()),
            })
            .collect();
        let placements = pack_tiles(&items, ctx.canvas_size(), ctx.padding())?;
        let records = assemble_records(&sources, symbols, &dedup, &placements);

        let metrics = metrics::compute(
            records.iter().map(|r| &r.trim),
            records.iter().filter(|r| !r.is_alias()).map(|r| &r.trim),
            ctx.canvas_size(),
        );
        let thresholds = &ctx.config().metrics;
        let level = metrics.level(thresholds.info_density, thresholds.warn_density);
        reporter.report(ProgressEvent::Metrics { metrics, level });
        complete(
            reporter,
            Stage::Pack,
            format!(
                "Packed {} tiles on {}x{} canvas",
                placements.len(),
                ctx.canvas_size(),
                ctx.canvas_size()
            ),
        );

        // [7/8] animations
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Animations });
        let frames = records.iter().map(|r| (r.id, r.name.as_str()));
        let scan = detect_animations(frames, &ctx.detect_options());
        let mut warnings = fail_on_errors(reporter, scan.issues)?;
        let animations = scan.animations;
        complete(reporter, Stage::Animations, format!("Found {} animations", animations.len()));

        // [8/8] render everything, then write
        reporter.report(ProgressEvent::StageStarted { stage: Stage::Write });
        let atlas = compose_atlas(
            ctx.canvas_size(),
            placements.iter().zip(&tiles).map(|(p, tile)| (p.pos, tile)),
        );
        drop(tiles);

        let data = AtlasData::new(&records, &animations, ctx.canvas_size())?;
        let layout = ctx.layout();
        let mut files = vec![
            OutputFile::new(layout.atlas.clone(), encode_png(&atlas)?),
            OutputFile::new(layout.header.clone(), CHeaderExporter::new().render(&data)),
            OutputFile::new(layout.source.clone(), CSourceExporter::new().render(&data)),
        ];
        if ctx.debug_html_enabled() {
            files.push(OutputFile::new(
                layout.debug_html.clone(),
                DebugHtmlExporter::new().render(&data),
            ));
        }

        if !ctx.is_dry_run() {
            for file in &files {
                write_file(file)?;
                reporter.report(ProgressEvent::OutputWritten {
                    path: file.path.clone(),
                    bytes: file.contents.len(),
                });
            }
        }
        let write_detail = if ctx.is_dry_run() {
            format!("Dry run: {} files rendered, nothing written", files.len())
        } else {
            format!("Wrote {} files", files.len())
        };
        complete(reporter, Stage::Write, write_detail);

        if let Some(advisory) = density_advisory(&metrics, level, thresholds.warn_density) {
            match level {
                DensityLevel::Warn => {
                    reporter.report(ProgressEvent::Warning { message: advisory.clone() });
                    warnings.push(advisory);
                }
                _ => reporter.report(ProgressEvent::Info { message: advisory }),
            }
        }

        let report = BuildReport {
            records,
            animations,
            metrics,
            outputs: files.into_iter().map(|f| f.path).collect(),
            warnings,
            duration: start.elapsed(),
            dry_run: ctx.is_dry_run(),
        };

        reporter.report(ProgressEvent::BuildCompleted {
            success: true,
            duration_ms: report.duration.as_millis() as u64,
            sprites: report.sprite_count(),
            unique: report.unique_count(),
            duplicates: report.duplicate_count(),
            animations: report.animation_count(),
            dry_run: report.dry_run,
        });

        Ok(BuildOutcome::Built(report))
    }
}

fn complete(reporter: &dyn ProgressReporter, stage: Stage, detail: String) {
    reporter.report(ProgressEvent::StageCompleted { stage, detail });
}

fn thread_pool(jobs: Option<usize>) -> Result<rayon::ThreadPool, BuildError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = jobs {
        builder = builder.num_threads(n);
    }
    Ok(builder.build()?)
}

/// Extrude the canonical images in ID order, consuming `images`.
///
/// Alias images are dropped up front and each trimmed buffer is freed as soon
/// as its tile exists.
fn extrude_canonical(
    pool: &rayon::ThreadPool,
    images: Vec<RgbaImage>,
    dedup: &Dedup,
) -> Vec<RgbaImage> {
    let canonical: Vec<RgbaImage> = images
        .into_iter()
        .zip(&dedup.alias_of)
        .filter_map(|(image, alias)| alias.is_none().then_some(image))
        .collect();
    pool.install(|| canonical.into_par_iter().map(|image| extrude(&image)).collect())
}

/// Report every finding of a validation pass; fail if any is an error.
///
/// Returns the warning messages when the pass is clean.
fn fail_on_errors(
    reporter: &dyn ProgressReporter,
    issues: Vec<ValidationIssue>,
) -> Result<Vec<String>, BuildError> {
    let (errors, warnings) = partition(issues);

    let messages: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
    for message in &messages {
        reporter.report(ProgressEvent::Warning { message: message.clone() });
    }

    if errors.is_empty() {
        return Ok(messages);
    }
    for error in &errors {
        reporter.report(ProgressEvent::Error { message: error.to_string() });
    }
    Err(BuildError::Validation(errors))
}

/// Turn per-sprite sources into the final record arena.
///
/// `placements` must hold one entry per canonical sprite, which
/// [`pack_tiles`] guarantees on success.
fn assemble_records(
    sources: &[SpriteSource],
    symbols: Vec<String>,
    dedup: &Dedup,
    placements: &[Placement],
) -> Vec<SpriteRecord> {
    let mut positions: Vec<Option<Point>> = vec![None; sources.len()];
    for placement in placements {
        positions[placement.id.index()] = Some(placement.pos);
    }

    sources
        .iter()
        .zip(symbols)
        .enumerate()
        .map(|(index, (source, symbol))| {
            let kind = match dedup.alias_of[index] {
                Some(of) => SpriteKind::Alias { of },
                None => SpriteKind::Canonical { atlas_pos: positions[index].unwrap_or_default() },
            };
            SpriteRecord {
                id: SpriteId(index),
                name: source.name.clone(),
                path: source.path.clone(),
                symbol,
                trim: source.trim,
                hash: source.hash.clone(),
                kind,
            }
        })
        .collect()
}

fn density_advisory(metrics: &AtlasMetrics, level: DensityLevel, warn: f64) -> Option<String> {
    match level {
        DensityLevel::Warn => Some(format!(
            "Atlas density is {:.1}% (over {:.0}%). Consider a larger atlas size.",
            metrics.density, warn
        )),
        DensityLevel::Info => Some(format!(
            "Atlas density is {:.1}%. Room is getting tight.",
            metrics.density
        )),
        DensityLevel::Normal => None,
    }
}
