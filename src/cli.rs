//! Command-line interface for foldersort.
//!
//! This module handles:
//! - Flag parsing (including the single-dash `-source dir` spelling)
//! - Mode selection
//! - Wiring configuration, output and signal handling around the engines

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::config::OrganizerConfig;
use crate::output::OutputFormatter;
use crate::pipeline::{OrganizeOptions, Organizer};
use crate::watch::stop_channel;

/// Printed when `--mode` is neither `once` nor `watch`.
pub const INVALID_MODE_MESSAGE: &str = "Invalid mode. Use 'once' or 'watch'.";

/// Long flags that may also be spelled with a single dash.
const SINGLE_DASH_FLAGS: &[&str] = &["source", "dest", "mode", "dry", "no-recursive", "config"];

/// Sort files into category folders by extension.
#[derive(Debug, Clone, Parser)]
#[command(name = "foldersort", version, about)]
pub struct Cli {
    /// Source directory
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Destination directory, created if absent
    #[arg(long, default_value = "./organized")]
    pub dest: PathBuf,

    /// Mode: once or watch
    #[arg(long, default_value = "once")]
    pub mode: String,

    /// Dry run (no changes)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub dry: bool,

    /// Do not traverse or watch subdirectories
    #[arg(
        long = "no-recursive",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub no_recursive: bool,

    /// Configuration file (defaults to ./.foldersort.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn options(&self) -> OrganizeOptions {
        OrganizeOptions {
            recursive: !self.no_recursive,
            dry_run: self.dry,
        }
    }
}

/// Which driver runs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Walk the source tree once.
    Once,
    /// Keep organizing as files appear, until interrupted.
    Watch,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(Mode::Once),
            "watch" => Ok(Mode::Watch),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Rewrites `-source dir` style flags into `--source dir`.
///
/// Only the known long flags are rewritten, the program name is left alone,
/// and nothing after a `--` separator is touched.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut passthrough = false;

    for arg in args {
        if !passthrough
            && let Some(text) = arg.to_str()
        {
            if text == "--" {
                passthrough = true;
            } else if let Some(flag) = text.strip_prefix('-')
                && !flag.starts_with('-')
                && SINGLE_DASH_FLAGS.contains(&flag.split('=').next().unwrap_or(flag))
            {
                normalized.push(OsString::from(format!("-{}", text)));
                continue;
            }
        }
        normalized.push(arg);
    }

    normalized
}

/// Runs the selected mode.
///
/// An unknown mode prints [`INVALID_MODE_MESSAGE`] and returns `Ok(())`
/// without touching the filesystem.
///
/// # Errors
///
/// Configuration problems and structural failures (destination cannot be
/// created, source cannot be read, watcher cannot start).
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use foldersort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["foldersort", "--source", "/tmp/in", "--dry"]);
/// run_cli(&cli).expect("organize failed");
/// ```
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let Ok(mode) = cli.mode.parse::<Mode>() else {
        OutputFormatter::plain(INVALID_MODE_MESSAGE);
        return Ok(());
    };

    let config =
        OrganizerConfig::load(cli.config.as_deref()).context("Error loading configuration")?;
    let organizer = Organizer::new(&cli.source, &cli.dest, cli.options())?
        .with_stability(config.stability_policy()?)
        .with_filters(config.compile_filters()?);

    info!(
        source = %organizer.source().display(),
        destination = %organizer.destination().display(),
        ?mode,
        "starting"
    );

    match mode {
        Mode::Once => organize_once(&organizer),
        Mode::Watch => watch(&organizer),
    }
}

fn organize_once(organizer: &Organizer) -> anyhow::Result<()> {
    let dry_run = organizer.options().dry_run;
    if dry_run {
        OutputFormatter::dry_run_notice("No files will be moved.");
    }

    let spinner = OutputFormatter::create_spinner();
    let result = organizer.organize_once(|report| {
        spinner.suspend(|| OutputFormatter::report(report));
        spinner.inc(1);
    });
    spinner.finish_and_clear();
    let summary = result?;

    if summary.moved == 0 && summary.failed == 0 {
        OutputFormatter::info("No files found to organize.");
        return Ok(());
    }

    if summary.moved > 0 {
        OutputFormatter::summary_table(&summary.by_category, summary.moved);
    }
    if summary.failed > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. Please review errors above.",
            summary.failed
        ));
    } else if dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else {
        OutputFormatter::success("Organization complete!");
    }
    Ok(())
}

fn watch(organizer: &Organizer) -> anyhow::Result<()> {
    let session = organizer.start_watch()?;

    let (trigger, stop) = stop_channel();
    ctrlc::set_handler(move || {
        OutputFormatter::plain("\nStopping watcher...");
        trigger.trigger();
    })
    .context("Error installing signal handler")?;

    OutputFormatter::watching(organizer.source());
    session.run_until(stop, OutputFormatter::report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["foldersort"]);
        assert_eq!(cli.source, PathBuf::from("."));
        assert_eq!(cli.dest, PathBuf::from("./organized"));
        assert_eq!(cli.mode, "once");
        assert!(!cli.dry);
        assert!(!cli.no_recursive);
        assert!(cli.config.is_none());
        assert_eq!(
            cli.options(),
            OrganizeOptions {
                recursive: true,
                dry_run: false
            }
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("once".parse::<Mode>(), Ok(Mode::Once));
        assert_eq!("watch".parse::<Mode>(), Ok(Mode::Watch));
        assert!("Watch".parse::<Mode>().is_err());
        assert!("daemon".parse::<Mode>().is_err());
    }

    #[test]
    fn test_single_dash_flags_are_normalized() {
        let normalized = normalize_legacy_flags(args(&[
            "foldersort",
            "-source",
            "in",
            "-dest=out",
            "-mode",
            "watch",
            "-dry",
            "-no-recursive",
        ]));
        assert_eq!(
            normalized,
            args(&[
                "foldersort",
                "--source",
                "in",
                "--dest=out",
                "--mode",
                "watch",
                "--dry",
                "--no-recursive",
            ])
        );

        let cli = Cli::parse_from(normalized);
        assert_eq!(cli.source, PathBuf::from("in"));
        assert_eq!(cli.dest, PathBuf::from("out"));
        assert_eq!(cli.mode, "watch");
        assert!(cli.dry);
        assert!(cli.no_recursive);
    }

    #[test]
    fn test_boolean_flags_accept_explicit_values() {
        let cli = Cli::parse_from(normalize_legacy_flags(args(&[
            "foldersort",
            "-dry=true",
            "-no-recursive=false",
        ])));
        assert!(cli.dry);
        assert!(!cli.no_recursive);

        let cli = Cli::parse_from(args(&["foldersort", "--dry=false", "--no-recursive=1"]));
        assert!(!cli.dry);
        assert!(cli.no_recursive);

        let cli = Cli::parse_from(args(&["foldersort", "--dry", "--mode", "watch"]));
        assert!(cli.dry);
        assert_eq!(cli.mode, "watch");
    }

    #[test]
    fn test_normalize_leaves_other_arguments_alone() {
        let input = args(&["-source", "--dest", "x", "-h", "-", "--", "-mode"]);
        let normalized = normalize_legacy_flags(input);
        assert_eq!(
            normalized,
            args(&["-source", "--dest", "x", "-h", "-", "--", "-mode"])
        );
    }

    #[test]
    fn test_invalid_mode_takes_no_action() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dest = temp_dir.path().join("organized");
        let cli = Cli::parse_from([
            "foldersort".into(),
            OsString::from("--source"),
            temp_dir.path().as_os_str().to_owned(),
            OsString::from("--dest"),
            dest.as_os_str().to_owned(),
            OsString::from("--mode"),
            OsString::from("sometimes"),
        ]);

        run_cli(&cli).expect("invalid mode is not an error");
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cli = Cli {
            source: temp_dir.path().to_path_buf(),
            dest: temp_dir.path().join("organized"),
            mode: "once".to_string(),
            dry: false,
            no_recursive: false,
            config: Some(temp_dir.path().join("nope.toml")),
        };
        assert!(run_cli(&cli).is_err());
    }
}
