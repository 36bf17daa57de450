//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{resolve_path, CliOverrides};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// spritec - compile a directory of PNG sprites into an atlas and C metadata
#[derive(Parser)]
#[command(name = "spritec")]
#[command(about = "spritec - compile PNG sprites into a packed atlas with C metadata")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the atlas image, C declarations/definitions and debug view
    Build {
        #[command(flatten)]
        args: BuildArgs,

        /// Run every stage but write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate sources without writing anything (same as `build --dry-run`)
    Check {
        #[command(flatten)]
        args: BuildArgs,
    },
}

/// Options shared by `build` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Config file (default: nearest spritec.toml above the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the source PNGs
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for atlas.png and atlas_debug.html
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Separate directory for atlas_data.h and atlas_data.c
    #[arg(long)]
    pub header_dir: Option<PathBuf>,

    /// Atlas edge length: 256, 512, 1024, 2048, 4096 or 8192
    #[arg(short, long)]
    pub size: Option<u32>,

    /// Pixels of padding after every tile
    #[arg(short, long)]
    pub padding: Option<u32>,

    /// Skip atlas_debug.html
    #[arg(long)]
    pub no_debug: bool,

    /// Give every sprite its own tile, even identical ones
    #[arg(long)]
    pub no_dedup: bool,

    /// Report animation problems as warnings instead of failing
    #[arg(long)]
    pub no_strict: bool,

    /// Decoder threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Emit progress as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Show per-sprite detail
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Flags that override `spritec.toml`. Switches only ever turn features off.
    ///
    /// Relative paths are taken from the working directory, not from the
    /// directory holding `spritec.toml`.
    pub fn overrides(&self) -> CliOverrides {
        match std::env::current_dir() {
            Ok(cwd) => self.overrides_from(&cwd),
            Err(_) => self.overrides_from(Path::new("")),
        }
    }

    /// Same as [`overrides`](Self::overrides) with an explicit working directory.
    pub fn overrides_from(&self, cwd: &Path) -> CliOverrides {
        let absolute = |path: &Option<PathBuf>| path.as_deref().map(|p| resolve_path(cwd, p));
        CliOverrides {
            input: absolute(&self.input),
            output: absolute(&self.output),
            header_dir: absolute(&self.header_dir),
            size: self.size,
            padding: self.padding,
            dedup: self.no_dedup.then_some(false),
            strict: self.no_strict.then_some(false),
            debug_html: self.no_debug.then_some(false),
            jobs: self.jobs,
        }
    }
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { args, dry_run } => build::run_build(&args, dry_run),
        Commands::Check { args } => build::run_build(&args, true),
    }
}
