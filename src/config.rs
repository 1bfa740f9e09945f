//! Suite-wide configuration.
//!
//! A `Config` is built once per suite run and handed to the [`Runner`], which
//! passes the relevant parts on to its recorder and reporter.
//!
//! [`Runner`]: crate::runner::Runner

use crate::errors::{HarnessError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default tolerance used by `assert_float` and `check_float`.
pub const DEFAULT_FLOAT_TOLERANCE: f64 = 1e-10;

/// Which part of the project a suite belongs to. Embedded in every report
/// message so failures from extension suites can be told apart.
///
/// In configuration files the group is a plain string: `core`, or the name
/// of the extension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Group {
    #[default]
    Core,
    Extension(String),
}

impl Group {
    pub fn extension(name: impl Into<String>) -> Self {
        Self::Extension(name.into())
    }
}

impl From<String> for Group {
    fn from(name: String) -> Self {
        if name == "core" {
            Group::Core
        } else {
            Group::Extension(name)
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Core => write!(f, "core"),
            Group::Extension(name) => write!(f, "ext: {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve `Auto` against the current stdout.
    pub fn use_colors(self) -> bool {
        match self {
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Print a prefix per test, and backtraces for crashes.
    pub verbose: bool,
    pub group: Group,
    pub float_tolerance: f64,
    pub color: ColorMode,
    /// Print the elapsed time line in the summary.
    pub timing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            group: Group::Core,
            float_tolerance: DEFAULT_FLOAT_TOLERANCE,
            color: ColorMode::Auto,
            timing: true,
        }
    }
}

impl Config {
    /// Load a configuration file. Missing keys take their default values.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            tracing::warn!("empty configuration, using defaults");
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn validate(self) -> Result<Self> {
        if !self.float_tolerance.is_finite() || self.float_tolerance <= 0.0 {
            return Err(HarnessError::InvalidTolerance {
                value: self.float_tolerance,
            });
        }
        Ok(self)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = group;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.float_tolerance = tolerance;
        self
    }

    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }
}
