//! Entry point for the `test_runner` binary.

use crate::cli::args::RunnerArgs;
use crate::config::{Config, Group};
use crate::runner::{Counts, Runner};
use crate::selftest;
use clap::Parser;

pub mod args;

/// Parse the process arguments and run the self-test suite.
pub fn run() -> miette::Result<Counts> {
    run_with(RunnerArgs::parse())
}

pub fn run_with(args: RunnerArgs) -> miette::Result<Counts> {
    let config = build_config(&args)?;
    tracing::debug!(?config, "starting self-test suite");
    let mut runner = Runner::stdout(config);
    let ran = selftest::run_suite(&mut runner, args.filter.as_deref());
    if ran == 0 {
        tracing::warn!(filter = ?args.filter, "no tests matched");
    }
    runner.report();
    Ok(runner.state().counts())
}

/// Defaults, then the configuration file, then command-line flags.
pub fn build_config(args: &RunnerArgs) -> miette::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    if args.verbose {
        config = config.with_verbose(true);
    }
    if let Some(name) = &args.extension {
        config = config.with_group(Group::extension(name.clone()));
    }
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    if let Some(color) = args.color {
        config = config.with_color(color);
    }
    if args.no_time {
        config = config.with_timing(false);
    }
    Ok(config.validate()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;

    #[test]
    fn flags_override_defaults() {
        let args = RunnerArgs::parse_from([
            "test_runner",
            "--verbose",
            "--extension",
            "sprintf",
            "--tolerance",
            "0.5",
            "--color",
            "never",
            "--no-time",
        ]);
        let config = build_config(&args).unwrap();
        assert!(config.verbose);
        assert_eq!(config.group, Group::extension("sprintf"));
        assert_eq!(config.float_tolerance, 0.5);
        assert_eq!(config.color, ColorMode::Never);
        assert!(!config.timing);
    }

    #[test]
    fn rejects_negative_tolerance() {
        let args = RunnerArgs::parse_from(["test_runner", "--tolerance=-1"]);
        assert!(build_config(&args).is_err());
    }
}
