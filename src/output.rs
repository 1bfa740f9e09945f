//! Output sinks for progress marks and the final report.

use crate::config::ColorMode;
use crate::runner::Classification;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub trait OutputSink {
    /// Write `text` exactly as given; no newline is added.
    fn emit(&mut self, text: &str);

    fn emit_progress(&mut self, classification: Classification) {
        self.emit(classification.mark());
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, text: &str) {
        (**self).emit(text);
    }

    fn emit_progress(&mut self, classification: Classification) {
        (**self).emit_progress(classification);
    }
}

/// Collects output into a String for testing or programmatic capture.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Writes to stdout, colouring progress marks when enabled.
pub struct StdoutSink {
    stream: StandardStream,
}

impl StdoutSink {
    pub fn new(color: ColorMode) -> Self {
        let choice = if color.use_colors() {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self {
            stream: StandardStream::stdout(choice),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        let _ = self.stream.write_all(text.as_bytes());
        let _ = self.stream.flush();
    }

    fn emit_progress(&mut self, classification: Classification) {
        let mut spec = ColorSpec::new();
        match classification {
            Classification::Ok => spec.set_fg(Some(Color::Green)),
            Classification::Fail => spec.set_fg(Some(Color::Red)),
            Classification::Crash => spec.set_fg(Some(Color::Red)).set_bold(true),
            Classification::Skip => spec.set_fg(Some(Color::Yellow)),
        };
        let _ = self.stream.set_color(&spec);
        let _ = self.stream.write_all(classification.mark().as_bytes());
        let _ = self.stream.reset();
        let _ = self.stream.flush();
    }
}
