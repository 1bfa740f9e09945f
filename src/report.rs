//! Final summary of a suite run.

use crate::config::Config;
use crate::runner::RunState;
use std::fmt::Write;

/// Renders the detail listing and summary block for a [`RunState`].
///
/// Layout, one item per line:
///
/// ```text
///
/// <entry>...
/// Total: <n>
///    OK: <n>
///    KO: <n>
/// Crash: <n>
///  Skip: <n>
///  Time: <seconds> seconds
/// ```
pub struct Reporter<'a> {
    state: &'a RunState,
    config: &'a Config,
}

impl<'a> Reporter<'a> {
    pub fn new(state: &'a RunState, config: &'a Config) -> Self {
        Self { state, config }
    }

    pub fn render(&self) -> String {
        let counts = self.state.counts();
        let mut out = String::from("\n");
        for message in self.state.messages() {
            out.push_str(message);
            out.push('\n');
        }
        let _ = writeln!(out, "Total: {}", counts.total());
        let _ = writeln!(out, "   OK: {}", counts.ok);
        let _ = writeln!(out, "   KO: {}", counts.ko);
        let _ = writeln!(out, "Crash: {}", counts.crash);
        let _ = writeln!(out, " Skip: {}", counts.skip);
        if self.config.timing {
            let _ = writeln!(
                out,
                " Time: {:.2} seconds",
                self.state.elapsed().as_secs_f64()
            );
        }
        out
    }
}
