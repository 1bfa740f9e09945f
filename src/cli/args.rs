//! Command-line arguments for the self-test runner.

use crate::config::ColorMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "test_runner",
    version,
    about = "Run the assay self-test suite and print the report."
)]
pub struct RunnerArgs {
    /// Print each test description and crash backtraces.
    #[arg(short, long)]
    pub verbose: bool,

    /// Label the run as belonging to the named extension instead of core.
    #[arg(long, value_name = "NAME")]
    pub extension: Option<String>,

    /// Tolerance for floating-point comparisons.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,

    /// Leave the elapsed time out of the summary.
    #[arg(long)]
    pub no_time: bool,

    /// YAML configuration file; flags override its values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run only tests whose description contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,
}
