//! Runs assertion blocks and aggregates their outcomes.

use crate::config::Config;
use crate::message::{Entry, Failure, Severity};
use crate::output::{OutputSink, StdoutSink};
use crate::recorder::Recorder;
use crate::report::Reporter;
use crate::signal::{self, Raised};
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome category of one assertion block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Ok,
    Fail,
    Crash,
    Skip,
}

impl Classification {
    /// Progress mark printed after the block finishes.
    pub fn mark(self) -> &'static str {
        match self {
            Classification::Ok => ".",
            Classification::Fail => "F",
            Classification::Crash => "X",
            Classification::Skip => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashInfo {
    pub kind: String,
    pub message: String,
    pub backtrace: Vec<String>,
}

impl From<&Raised> for CrashInfo {
    fn from(raised: &Raised) -> Self {
        Self {
            kind: raised.kind().to_string(),
            message: raised.message(),
            backtrace: raised.backtrace_lines(),
        }
    }
}

/// What the failure boundary observed for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail(Vec<Failure>),
    Skip(String),
    Crash(CrashInfo),
}

impl Outcome {
    pub fn classification(&self) -> Classification {
        match self {
            Outcome::Ok => Classification::Ok,
            Outcome::Fail(_) => Classification::Fail,
            Outcome::Skip(_) => Classification::Skip,
            Outcome::Crash(_) => Classification::Crash,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub ok: usize,
    pub ko: usize,
    pub crash: usize,
    pub skip: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.ok + self.ko + self.crash + self.skip
    }

    /// Failed or crashed blocks. Skips do not count.
    pub fn has_failures(&self) -> bool {
        self.ko > 0 || self.crash > 0
    }

    fn bump(&mut self, classification: Classification) {
        match classification {
            Classification::Ok => self.ok += 1,
            Classification::Fail => self.ko += 1,
            Classification::Crash => self.crash += 1,
            Classification::Skip => self.skip += 1,
        }
    }
}

/// Counters and report entries for one suite run.
#[derive(Debug, Clone)]
pub struct RunState {
    counts: Counts,
    messages: Vec<String>,
    started: Instant,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            counts: Counts::default(),
            messages: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    /// Report entries in the order the blocks ran. Passing blocks add none.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn record(&mut self, classification: Classification, message: Option<String>) {
        self.counts.bump(classification);
        if let Some(message) = message {
            self.messages.push(message);
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes assertion blocks, one at a time, behind a failure boundary.
pub struct Runner<S: OutputSink = StdoutSink> {
    config: Config,
    state: RunState,
    recorder: Recorder,
    sink: S,
}

impl Runner<StdoutSink> {
    pub fn stdout(config: Config) -> Self {
        let sink = StdoutSink::new(config.color);
        Self::new(config, sink)
    }
}

impl<S: OutputSink> Runner<S> {
    pub fn new(config: Config, sink: S) -> Self {
        let recorder = Recorder::new(&config);
        Self {
            config,
            state: RunState::new(),
            recorder,
            sink,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The recorder outside of any block. Checks made through it are not
    /// recorded; they only return their result.
    pub fn recorder(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    /// Run one assertion block.
    ///
    /// Nothing raised by `body` escapes: returned errors and panics become
    /// crashes, [`skip`](crate::skip) becomes a skip, and recorded failures
    /// make the block fail.
    pub fn assert<F>(&mut self, description: &str, iso: &str, body: F) -> Classification
    where
        F: FnOnce(&mut Recorder) -> Result<(), Raised>,
    {
        if self.config.verbose {
            let iso_part = if iso.is_empty() {
                String::new()
            } else {
                format!(" [{}]", iso)
            };
            self.sink.emit(&format!("{}{} : ", description, iso_part));
        }
        debug!(description, iso, "running assertion block");

        self.recorder.begin();
        let recorder = &mut self.recorder;
        let result = signal::catch(|| body(recorder));
        let failures = self.recorder.finish();

        let outcome = match result {
            Ok(()) if failures.is_empty() => Outcome::Ok,
            Ok(()) => Outcome::Fail(failures),
            Err(raised) => match raised.skip_cause() {
                Some(cause) => Outcome::Skip(cause.to_string()),
                None => Outcome::Crash(CrashInfo::from(&raised)),
            },
        };
        let classification = outcome.classification();
        let message = self.format_outcome(description, iso, &outcome);
        self.state.record(classification, message);
        self.sink.emit_progress(classification);

        if self.config.verbose {
            self.sink.emit("\n");
        }
        debug!(description, ?classification, "assertion block finished");
        classification
    }

    fn format_outcome(&self, description: &str, iso: &str, outcome: &Outcome) -> Option<String> {
        let group = &self.config.group;
        let entry = match outcome {
            Outcome::Ok => return None,
            Outcome::Fail(failures) => {
                Entry::new(Severity::Fail, description, iso, group).failures(failures)
            }
            Outcome::Skip(cause) => Entry::new(Severity::Skip, description, iso, group).cause(cause),
            Outcome::Crash(crash) => {
                let entry = Entry::new(Severity::Crash(&crash.kind), description, iso, group)
                    .cause(&crash.message);
                if self.config.verbose {
                    entry.backtrace(&crash.backtrace)
                } else {
                    entry
                }
            }
        };
        Some(entry.render())
    }

    /// Print every recorded entry followed by the summary block.
    pub fn report(&mut self) {
        let text = Reporter::new(&self.state, &self.config).render();
        self.sink.emit(&text);
    }
}
