//! spritec - offline sprite atlas compiler

use std::process::ExitCode;

use spritec::cli;

fn main() -> ExitCode {
    cli::run()
}
