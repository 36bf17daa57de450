//! Build progress reporting.
//!
//! Every pipeline stage writes structured [`ProgressEvent`]s to a
//! [`ProgressReporter`] it is handed; nothing logs through global state.
//! Supports console output (with colors), JSON lines, and in-memory capture.
//!
//! # Example
//!
//! ```ignore
//! use spritec::build::progress::{ConsoleProgress, ProgressEvent, ProgressReporter, Stage};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::StageStarted { stage: Stage::Pack });
//! reporter.report(ProgressEvent::Warning { message: "atlas almost full".to_string() });
//! ```

use crate::metrics::{AtlasMetrics, DensityLevel};
use crate::sprite::{Point, Size, SpriteId};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scan,
    Load,
    Identifiers,
    Dedup,
    Extrude,
    Pack,
    Animations,
    Write,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Scan,
        Stage::Load,
        Stage::Identifiers,
        Stage::Dedup,
        Stage::Extrude,
        Stage::Pack,
        Stage::Animations,
        Stage::Write,
    ];

    /// 1-based position in [`Stage::ALL`].
    pub fn number(self) -> usize {
        Stage::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Scan => "Scanning for images",
            Stage::Load => "Loading and trimming sprites",
            Stage::Identifiers => "Checking identifier collisions",
            Stage::Dedup => "Deduplicating sprites",
            Stage::Extrude => "Extruding sprite edges",
            Stage::Pack => "Packing atlas",
            Stage::Animations => "Detecting animation sequences",
            Stage::Write => "Writing output files",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.number(), Stage::ALL.len(), self.label())
    }
}

/// Events that can be reported during a build.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Build process started
    BuildStarted {
        input: PathBuf,
        output: PathBuf,
        canvas: u32,
        padding: u32,
        dedup: bool,
        strict: bool,
    },
    /// A stage started
    StageStarted { stage: Stage },
    /// A stage finished; `detail` summarizes what it did
    StageCompleted { stage: Stage, detail: String },
    /// One sprite decoded and trimmed (verbose)
    SpriteProcessed {
        id: SpriteId,
        name: String,
        original: Size,
        trimmed: Size,
        offset: Point,
    },
    /// A sprite was found to duplicate an earlier one
    Alias {
        id: SpriteId,
        name: String,
        of: SpriteId,
        of_name: String,
    },
    /// Trim and density statistics
    Metrics { metrics: AtlasMetrics, level: DensityLevel },
    /// An artifact was written
    OutputWritten { path: PathBuf, bytes: usize },
    /// A warning was generated
    Warning { message: String },
    /// Informational notice
    Info { message: String },
    /// An error occurred
    Error { message: String },
    /// Build process completed
    BuildCompleted {
        success: bool,
        duration_ms: u64,
        sprites: usize,
        unique: usize,
        duplicates: usize,
        animations: usize,
        dry_run: bool,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Records every event; used by tests and by callers embedding the pipeline.
#[derive(Debug, Default)]
pub struct MemoryProgress {
    events: Mutex<Vec<ProgressEvent>>,
    verbose: bool,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also request verbose-only events.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Messages of all `Warning` events.
    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Warning { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for MemoryProgress {
    fn report(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a console reporter on stderr; colors only when stderr is a tty.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { use_colors: false, verbose: false, output: Mutex::new(Box::new(output)) }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn bold(&self, text: &str) -> String {
        self.color(text, "\x1b[1m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BuildStarted { input, output, canvas, padding, dedup, strict } => {
                self.writeln(&self.bold("spritec asset build"));
                self.writeln(&format!("  Input:    {}", input.display()));
                self.writeln(&format!("  Output:   {}", output.display()));
                self.writeln(&format!("  Atlas:    {}x{} (padding {})", canvas, canvas, padding));
                self.writeln(&format!(
                    "  Dedup:    {}  Strict: {}",
                    if dedup { "on" } else { "off" },
                    if strict { "on" } else { "off" }
                ));
            }
            ProgressEvent::StageStarted { stage } => {
                self.writeln(&format!("\n{}...", self.cyan(&stage.to_string())));
            }
            ProgressEvent::StageCompleted { detail, .. } => {
                self.writeln(&format!("      {}", detail));
            }
            ProgressEvent::SpriteProcessed { id, name, original, trimmed, offset } => {
                if self.verbose {
                    self.writeln(&format!(
                        "      [{:3}] {}: {} -> {} (offset {}, {})",
                        id.index(),
                        name,
                        original,
                        trimmed,
                        offset.x,
                        offset.y
                    ));
                }
            }
            ProgressEvent::Alias { name, of_name, .. } => {
                if self.verbose {
                    self.writeln(&format!("      {} -> {}", name, of_name));
                }
            }
            ProgressEvent::Metrics { metrics, level } => {
                self.writeln(&format!(
                    "      Trim savings: {:.1}% ({} -> {} px)",
                    metrics.trim_savings, metrics.original_px, metrics.trimmed_px
                ));
                let density = format!("{:.1}%", metrics.density);
                let density = match level {
                    DensityLevel::Warn => self.yellow(&density),
                    DensityLevel::Info => self.cyan(&density),
                    DensityLevel::Normal => self.green(&density),
                };
                self.writeln(&format!(
                    "      Density: {}  Waste: {:.1}%  ({} / {} px)",
                    density, metrics.waste, metrics.used_px, metrics.canvas_px
                ));
            }
            ProgressEvent::OutputWritten { path, bytes } => {
                self.writeln(&format!(
                    "      {} {} ({} bytes)",
                    self.green("wrote"),
                    path.display(),
                    bytes
                ));
            }
            ProgressEvent::Warning { message } => {
                self.writeln(&format!("{} {}", self.yellow("[warn]"), message));
            }
            ProgressEvent::Info { message } => {
                self.writeln(&format!("{} {}", self.cyan("[info]"), message));
            }
            ProgressEvent::Error { message } => {
                self.writeln(&format!("{} {}", self.red("[error]"), message));
            }
            ProgressEvent::BuildCompleted {
                success,
                duration_ms,
                sprites,
                unique,
                duplicates,
                animations,
                dry_run,
            } => {
                let duration = format_duration(duration_ms);
                if success {
                    self.writeln(&format!(
                        "\n{} {} sprites ({} unique, {} duplicates), {} animations in {}{}",
                        self.green("[done]"),
                        self.bold(&sprites.to_string()),
                        unique,
                        duplicates,
                        animations,
                        duration,
                        if dry_run { " (dry run, nothing written)" } else { "" }
                    ));
                } else {
                    self.writeln(&format!(
                        "\n{} Build failed after {}",
                        self.red("[error]"),
                        duration
                    ));
                }
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// JSON progress reporter for machine-readable output (one object per line).
pub struct JsonProgress {
    /// Output writer
    output: Mutex<Box<dyn Write + Send>>,
    verbose: bool,
}

impl fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonProgress").field("verbose", &self.verbose).finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stderr.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stderr())), verbose: false }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)), verbose: false }
    }

    /// Include per-sprite events.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let Ok(json) = serde_json::to_string(&event) else {
            return;
        };
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", json);
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Format a duration in milliseconds to a human-readable string.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
