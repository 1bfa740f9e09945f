// Runs the assay self-test suite.
// Usage: cargo run --bin test_runner -- [--verbose] [--filter TEXT]

use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let counts = assay::cli::run()?;
    if counts.has_failures() {
        process::exit(1);
    }
    Ok(())
}
