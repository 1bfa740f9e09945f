//! Assertion primitives, a per-block failure boundary, and a summary report.
//!
//! ```
//! use assay::{skip, Config, OutputBuffer, Runner};
//!
//! let mut runner = Runner::new(Config::default().with_timing(false), OutputBuffer::new());
//! runner.assert("Integer#+", "15.2.8.3.1", |t| {
//!     t.assert_equal(4, 2 + 2);
//!     Ok(())
//! });
//! runner.assert("Float#round", "", |_| skip("no float support"));
//! runner.report();
//! assert!(runner.sink().as_str().starts_with(".?\n"));
//! ```

pub use crate::config::{ColorMode, Config, Group, DEFAULT_FLOAT_TOLERANCE};
pub use crate::errors::HarnessError;
pub use crate::message::Failure;
pub use crate::output::{OutputBuffer, OutputSink, StdoutSink};
pub use crate::recorder::{check_float, Actual, AsFloat, Includes, Recorder};
pub use crate::report::Reporter;
pub use crate::runner::{Classification, Counts, CrashInfo, Outcome, RunState, Runner};
pub use crate::signal::{skip, Raised, SkipSignal};

pub mod cli;
pub mod config;
pub mod errors;
pub mod message;
pub mod output;
pub mod recorder;
pub mod report;
pub mod runner;
pub mod selftest;
pub mod signal;
