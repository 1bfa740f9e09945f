//! The harness's own regression suite, run by the `test_runner` binary.
//!
//! Each case drives one primitive through a [`Runner`] and checks both the
//! result and, via a nested runner, what a failing use of it reports.

use crate::config::Config;
use crate::output::{OutputBuffer, OutputSink};
use crate::recorder::{check_float, Recorder};
use crate::runner::{Classification, Runner};
use crate::signal::{skip, Raised};
use std::collections::HashMap;
use std::num::ParseIntError;

pub type Body = fn(&mut Recorder) -> Result<(), Raised>;

pub struct SelfTest {
    pub description: &'static str,
    pub iso: &'static str,
    pub body: Body,
}

pub static SUITE: &[SelfTest] = &[
    SelfTest {
        description: "assert_true",
        iso: "",
        body: assert_true_case,
    },
    SelfTest {
        description: "assert_false",
        iso: "",
        body: assert_false_case,
    },
    SelfTest {
        description: "assert_equal",
        iso: "",
        body: assert_equal_case,
    },
    SelfTest {
        description: "assert_equal with supplier",
        iso: "",
        body: assert_equal_supplier_case,
    },
    SelfTest {
        description: "assert_not_equal",
        iso: "",
        body: assert_not_equal_case,
    },
    SelfTest {
        description: "assert_same",
        iso: "",
        body: assert_same_case,
    },
    SelfTest {
        description: "assert_nil",
        iso: "",
        body: assert_nil_case,
    },
    SelfTest {
        description: "assert_include",
        iso: "",
        body: assert_include_case,
    },
    SelfTest {
        description: "assert_kind_of",
        iso: "",
        body: assert_kind_of_case,
    },
    SelfTest {
        description: "check_float",
        iso: "",
        body: check_float_case,
    },
    SelfTest {
        description: "assert_float",
        iso: "",
        body: assert_float_case,
    },
    SelfTest {
        description: "assert_raise",
        iso: "",
        body: assert_raise_case,
    },
    SelfTest {
        description: "assert_nothing_raised",
        iso: "",
        body: assert_nothing_raised_case,
    },
    SelfTest {
        description: "skip",
        iso: "",
        body: skip_case,
    },
    SelfTest {
        description: "crash isolation",
        iso: "",
        body: crash_case,
    },
    SelfTest {
        description: "recording outside a block",
        iso: "",
        body: outside_block_case,
    },
    SelfTest {
        description: "report",
        iso: "",
        body: report_case,
    },
];

/// Run every case whose description contains `filter` (case-insensitive).
/// Returns the number of cases run.
pub fn run_suite<S: OutputSink>(runner: &mut Runner<S>, filter: Option<&str>) -> usize {
    let filter = filter.map(str::to_lowercase);
    let mut ran = 0;
    for case in SUITE {
        if let Some(f) = &filter {
            if !case.description.to_lowercase().contains(f.as_str()) {
                continue;
            }
        }
        runner.assert(case.description, case.iso, case.body);
        ran += 1;
    }
    ran
}

/// Run `body` in a fresh, quiet runner and return what it recorded.
fn probe(body: impl FnOnce(&mut Recorder) -> Result<(), Raised>) -> (Classification, String) {
    let config = Config::default().with_timing(false);
    let mut inner = Runner::new(config, OutputBuffer::new());
    let classification = inner.assert("probe", "", body);
    let message = inner.state().messages().join("\n");
    (classification, message)
}

fn assert_true_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_true(true);
    let (c, message) = probe(|i| {
        i.assert_true(false);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "Assertion[1] Failed: Expected false to be true");
    Ok(())
}

fn assert_false_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_false(false);
    let (c, message) = probe(|i| {
        i.assert_false(true);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "Expected true to be false");
    Ok(())
}

fn assert_equal_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_equal(4, 2 + 2);
    t.assert_equal("abc", String::from("abc"));
    let (c, message) = probe(|i| {
        i.assert_equal(4, 2 + 3);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "    Expected: 4\n      Actual: 5");
    Ok(())
}

fn assert_equal_supplier_case(t: &mut Recorder) -> Result<(), Raised> {
    let mut calls = 0;
    t.assert_equal_with(vec![1, 2], || {
        calls += 1;
        vec![1, 2]
    });
    t.assert_equal(1, calls);
    Ok(())
}

fn assert_not_equal_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_not_equal(1, 2);
    let (c, message) = probe(|i| {
        i.assert_not_equal('a', 'a');
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "Expected to be not equal");
    Ok(())
}

fn assert_same_case(t: &mut Recorder) -> Result<(), Raised> {
    let a = String::from("same");
    let b = a.clone();
    t.assert_same(&a, &a);
    t.assert_not_same(&a, &b);
    let (c, message) = probe(|i| {
        i.assert_same(&a, &b);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "to be the same object as");
    Ok(())
}

fn assert_nil_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_nil::<u8>(&None);
    let (c, message) = probe(|i| {
        i.assert_nil(&Some("x"));
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "Expected Some(\"x\") to be nil");
    Ok(())
}

fn assert_include_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_include(&[1, 2, 3], &3);
    t.assert_include("harness", "ness");
    let map: HashMap<&str, u8> = HashMap::from([("key", 1)]);
    t.assert_include(&map, &"key");
    t.assert_not_include(&vec!['a'], &'b');
    let (c, message) = probe(|i| {
        i.assert_include(&[1, 2], &7);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "    Collection: [1, 2]\n        Object: 7");
    Ok(())
}

fn assert_kind_of_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_kind_of::<String, _>(&String::new());
    let (c, message) = probe(|i| {
        i.assert_kind_of::<i64, _>(&1.5f32);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "Expected 1.5 to be a kind of i64, not f32");
    Ok(())
}

fn check_float_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_true(check_float(1.0, 1.00001, 0.0001));
    t.assert_false(check_float(1.0, 1.01, 0.0001));
    t.assert_true(check_float(f64::INFINITY, 5.0, 0.0001));
    t.assert_true(check_float(f64::NAN, 0.0, 0.0001));
    Ok(())
}

fn assert_float_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_float(0.1 + 0.2, 0.3);
    t.assert_float(3, 3.0);
    let (c, message) = probe(|i| {
        i.assert_float(1.0, 2.0);
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "Float 1.0 expected to be equal to float 2.0");
    Ok(())
}

fn assert_raise_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_raise::<ParseIntError, i32>(|| Ok("x".parse::<i32>()?));
    t.assert_raise_kind::<()>("panic", || panic!("expected"));
    let (c, message) = probe(|i| {
        i.assert_raise::<ParseIntError, ()>(|| Ok(()));
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(
        message.as_str(),
        "Expected to raise ParseIntError but nothing was raised.",
    );
    Ok(())
}

fn assert_nothing_raised_case(t: &mut Recorder) -> Result<(), Raised> {
    t.assert_nothing_raised(|| Ok("7".parse::<i32>()?));
    let (c, message) = probe(|i| {
        i.assert_nothing_raised(|| Ok("y".parse::<i32>()?));
        Ok(())
    });
    t.assert_equal(Classification::Fail, c);
    t.assert_include(message.as_str(), "      Class: <ParseIntError>");
    Ok(())
}

fn skip_case(t: &mut Recorder) -> Result<(), Raised> {
    let (c, message) = probe(|_| skip("no float support"));
    t.assert_equal(Classification::Skip, c);
    t.assert_equal("Skip: probe => no float support (core)", message);
    Ok(())
}

fn crash_case(t: &mut Recorder) -> Result<(), Raised> {
    let (c, message) = probe(|_| {
        "nan".parse::<u8>()?;
        Ok(())
    });
    t.assert_equal(Classification::Crash, c);
    t.assert_include(message.as_str(), "ParseIntError: probe => invalid digit found in string");
    let (c, _) = probe(|_| panic!("unexpected"));
    t.assert_equal(Classification::Crash, c);
    Ok(())
}

fn outside_block_case(t: &mut Recorder) -> Result<(), Raised> {
    let mut inner = Runner::new(Config::default().with_timing(false), OutputBuffer::new());
    inner.assert("first", "", |_| Ok(()));
    let returned = inner.recorder().assert_equal(1, 2);
    t.assert_false(returned);
    t.assert_equal(1usize, inner.state().counts().total());
    t.assert_true(inner.state().messages().is_empty());
    Ok(())
}

fn report_case(t: &mut Recorder) -> Result<(), Raised> {
    let mut inner = Runner::new(Config::default().with_timing(false), OutputBuffer::new());
    inner.assert("ok", "", |_| Ok(()));
    inner.assert("fail", "", |i| {
        i.assert_true(false);
        Ok(())
    });
    inner.assert("skip", "", |_| skip(""));
    inner.assert("crash", "", |_| Err(Raised::new("RuntimeError", "boom")));
    inner.sink_mut().clear();
    inner.report();
    let text = inner.sink().as_str();
    t.assert_include(text, "Total: 4\n   OK: 1\n   KO: 1\nCrash: 1\n Skip: 1\n");
    let fail = text.find("Fail: fail");
    let skipped = text.find("Skip: skip");
    let crash = text.find("RuntimeError: crash");
    t.assert_true(fail < skipped && skipped < crash && fail.is_some());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_suite_passes() {
        let mut runner = Runner::new(Config::default().with_timing(false), OutputBuffer::new());
        let ran = run_suite(&mut runner, None);
        assert_eq!(ran, SUITE.len());
        let counts = runner.state().counts();
        assert_eq!(counts.ok, SUITE.len(), "{:?}", runner.state().messages());
        assert_eq!(runner.sink().as_str(), ".".repeat(SUITE.len()));
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut runner = Runner::new(Config::default().with_timing(false), OutputBuffer::new());
        assert_eq!(run_suite(&mut runner, Some("ASSERT_RAISE")), 1);
        assert_eq!(runner.state().counts().total(), 1);
    }
}
