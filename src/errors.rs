//! Error types for the harness itself.
//!
//! Failures raised *inside* test bodies never surface here; they are
//! classified by the runner. `HarnessError` only covers problems setting the
//! harness up, such as an unreadable or malformed configuration file.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    #[error("failed to read configuration file {}", .path.display())]
    #[diagnostic(code(assay::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration in {}", .path.display())]
    #[diagnostic(
        code(assay::config::parse),
        help("expected a YAML mapping with keys such as `verbose`, `group`, `float_tolerance`")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("float tolerance must be a finite positive number, got {value}")]
    #[diagnostic(code(assay::config::tolerance))]
    InvalidTolerance { value: f64 },
}

pub type Result<T> = std::result::Result<T, HarnessError>;
