use clap::Parser;
use foldersort::cli::{Cli, normalize_legacy_flags, run_cli};
use foldersort::logging::init_logging;
use foldersort::output::OutputFormatter;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse_from(normalize_legacy_flags(env::args_os()));

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
