//! Build command implementation (build, check)

use std::process::ExitCode;

use super::{BuildArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::progress::{ConsoleProgress, JsonProgress, ProgressEvent, ProgressReporter};
use crate::build::{BuildContext, BuildPipeline};
use crate::config::{load_config, merge_cli_overrides, validate_config};

fn reporter(args: &BuildArgs) -> Box<dyn ProgressReporter> {
    if args.json {
        Box::new(JsonProgress::with_output(std::io::stdout()).with_verbose(args.verbose))
    } else {
        Box::new(ConsoleProgress::new().with_verbose(args.verbose))
    }
}

/// Run the build command
///
/// Exit code 2 means the configuration or flags are invalid; 1 means the
/// build itself failed. An input directory without PNGs is a successful no-op.
pub fn run_build(args: &BuildArgs, dry_run: bool) -> ExitCode {
    let reporter = reporter(args);

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            reporter.report(ProgressEvent::Error { message: e.to_string() });
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if args.verbose {
        let message = match &loaded.source {
            Some(path) => format!("Using config: {}", path.display()),
            None => "No spritec.toml found, using defaults".to_string(),
        };
        reporter.report(ProgressEvent::Info { message });
    }

    let mut config = loaded.config;
    merge_cli_overrides(&mut config, &args.overrides());
    if let Err(e) = validate_config(&config) {
        reporter.report(ProgressEvent::Error { message: e.to_string() });
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let context = BuildContext::new(config, loaded.root).with_dry_run(dry_run);

    // The pipeline reports its own failures.
    match BuildPipeline::new(context).run(reporter.as_ref()) {
        Ok(_) => ExitCode::from(EXIT_SUCCESS),
        Err(_) => ExitCode::from(EXIT_ERROR),
    }
}
