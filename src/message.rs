//! Text building for failed checks and report entries.

use crate::config::Group;
use difference::{Changeset, Difference};
use std::fmt::{self, Debug};

/// One failed sub-check recorded while a test body ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// 1-based position among all checks made in the body, passing ones included.
    pub index: usize,
    pub message: String,
    pub diff: String,
}

pub fn inspect<T: Debug + ?Sized>(value: &T) -> String {
    format!("{:?}", value)
}

/// `std::any::type_name` with module paths dropped, e.g. `Vec<String>`.
pub fn type_label<T: ?Sized>() -> String {
    short_type_name(std::any::type_name::<T>())
}

/// Type names too generic to stand alone; these keep their nearest module.
const AMBIGUOUS_NAMES: &[&str] = &["Error", "ErrorKind"];

/// Drops module paths from a full type name. `std::io::error::Error`
/// becomes `io::Error`; a module named after the type itself is skipped.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut path: Vec<&str> = Vec::new();
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        let ident_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if ident_len == 0 {
            out.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        }
        path.push(&rest[..ident_len]);
        rest = &rest[ident_len..];
        match rest.strip_prefix("::") {
            Some(after) => rest = after,
            None => push_path(&mut out, &mut path),
        }
    }
    push_path(&mut out, &mut path);
    out
}

fn push_path(out: &mut String, path: &mut Vec<&str>) {
    let Some((name, modules)) = path.split_last() else {
        return;
    };
    if AMBIGUOUS_NAMES.contains(name) {
        let parent = modules
            .iter()
            .rev()
            .find(|module| !module.eq_ignore_ascii_case(name));
        if let Some(parent) = parent {
            out.push_str(parent);
            out.push_str("::");
        }
    }
    out.push_str(name);
    path.clear();
}

/// Expected/actual block for two values, followed by a line diff when both
/// values pretty-print over several lines.
pub fn assertion_diff<E, A>(expected: &E, actual: &A) -> String
where
    E: Debug + ?Sized,
    A: Debug + ?Sized,
{
    let mut text = diff_text(&inspect(expected), &inspect(actual));
    let pretty_expected = format!("{:#?}", expected);
    let pretty_actual = format!("{:#?}", actual);
    if pretty_expected != pretty_actual
        && pretty_expected.contains('\n')
        && pretty_actual.contains('\n')
    {
        text.push('\n');
        text.push_str(&line_diff(&pretty_expected, &pretty_actual));
    }
    text
}

/// Expected/actual block for already rendered text.
pub fn diff_text(expected: &str, actual: &str) -> String {
    format!("    Expected: {}\n      Actual: {}", expected, actual)
}

/// Class/Message block describing something that was raised.
pub fn raised_diff(kind: &str, message: &str) -> String {
    format!("      Class: <{}>\n    Message: {}", kind, message)
}

fn line_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut lines = vec!["        Diff:".to_string()];
    for diff in &changeset.diffs {
        let (sign, chunk) = match diff {
            Difference::Same(x) => (' ', x),
            Difference::Rem(x) => ('-', x),
            Difference::Add(x) => ('+', x),
        };
        lines.extend(chunk.lines().map(|line| format!("        {}{}", sign, line)));
    }
    lines.join("\n")
}

/// Leading tag of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity<'a> {
    Fail,
    Skip,
    Crash(&'a str),
}

impl fmt::Display for Severity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fail => write!(f, "Fail: "),
            Severity::Skip => write!(f, "Skip: "),
            Severity::Crash(kind) => write!(f, "{}: ", kind),
        }
    }
}

/// Everything that goes into one report entry.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub severity: Severity<'a>,
    pub description: &'a str,
    pub iso: &'a str,
    pub cause: &'a str,
    pub group: &'a Group,
    pub failures: &'a [Failure],
    pub backtrace: Option<&'a [String]>,
}

impl<'a> Entry<'a> {
    pub fn new(severity: Severity<'a>, description: &'a str, iso: &'a str, group: &'a Group) -> Self {
        Self {
            severity,
            description,
            iso,
            cause: "",
            group,
            failures: &[],
            backtrace: None,
        }
    }

    pub fn cause(mut self, cause: &'a str) -> Self {
        self.cause = cause;
        self
    }

    pub fn failures(mut self, failures: &'a [Failure]) -> Self {
        self.failures = failures;
        self
    }

    pub fn backtrace(mut self, backtrace: &'a [String]) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    pub fn render(&self) -> String {
        let mut msg = format!("{}{}", self.severity, self.description);
        if !self.iso.is_empty() {
            msg.push_str(&format!(" [{}]", self.iso));
        }
        if !self.cause.is_empty() {
            msg.push_str(&format!(" => {}", self.cause));
        }
        msg.push_str(&format!(" ({})", self.group));
        for failure in self.failures {
            msg.push_str(&format!(
                "\n - Assertion[{}] Failed: {}\n{}",
                failure.index, failure.message, failure.diff
            ));
        }
        if let Some(frames) = self.backtrace.filter(|frames| !frames.is_empty()) {
            msg.push_str(&format!("\nbacktrace:\n\t{}", frames.join("\n\t")));
        }
        msg
    }
}
