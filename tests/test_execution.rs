// Classification of assertion blocks through the public runner API.

use assay::{skip, Classification, Config, Counts, Group, OutputBuffer, Raised, Runner};
use std::fmt;

fn quiet_runner() -> Runner<OutputBuffer> {
    Runner::new(Config::default().with_timing(false), OutputBuffer::new())
}

#[derive(Debug)]
struct LoadError;

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixture missing")
    }
}

impl std::error::Error for LoadError {}

#[test]
fn passing_block_only_bumps_ok() {
    let mut runner = quiet_runner();
    let c = runner.assert("Integer#+", "15.2.8.3.1", |t| {
        t.assert_equal(4, 2 + 2);
        t.assert_true(true);
        Ok(())
    });
    assert_eq!(c, Classification::Ok);
    assert_eq!(
        runner.state().counts(),
        Counts {
            ok: 1,
            ..Counts::default()
        }
    );
    assert!(runner.state().messages().is_empty());
    assert_eq!(runner.sink().as_str(), ".");
}

#[test]
fn empty_block_passes() {
    let mut runner = quiet_runner();
    assert_eq!(runner.assert("nothing", "", |_| Ok(())), Classification::Ok);
}

#[test]
fn failing_block_lists_every_failure_in_order() {
    let mut runner = quiet_runner();
    let c = runner.assert("Array#push", "", |t| {
        t.assert_equal(4, 2 + 3);
        t.assert_true(true);
        t.assert_include(&vec![1], &2);
        Ok(())
    });
    assert_eq!(c, Classification::Fail);
    assert_eq!(runner.state().counts().ko, 1);
    assert_eq!(runner.sink().as_str(), "F");
    assert_eq!(
        runner.state().messages(),
        ["Fail: Array#push (core)\n \
          - Assertion[1] Failed: Expected to be equal\n    Expected: 4\n      Actual: 5\n \
          - Assertion[3] Failed: Expected [1] to include 2\n    Collection: [1]\n        Object: 2"]
    );
}

#[test]
fn skip_signal_is_not_a_failure() {
    let mut runner = quiet_runner();
    let c = runner.assert("Float#to_s", "15.2.9.3.16", |t| {
        t.assert_true(true);
        skip("float printing disabled")?;
        t.assert_true(false);
        Ok(())
    });
    assert_eq!(c, Classification::Skip);
    let counts = runner.state().counts();
    assert_eq!((counts.ok, counts.ko, counts.crash, counts.skip), (0, 0, 0, 1));
    assert_eq!(
        runner.state().messages(),
        ["Skip: Float#to_s [15.2.9.3.16] => float printing disabled (core)"]
    );
    assert_eq!(runner.sink().as_str(), "?");
}

#[test]
fn returned_error_crashes() {
    let mut runner = quiet_runner();
    let c = runner.assert("load", "", |_| Err(LoadError.into()));
    assert_eq!(c, Classification::Crash);
    assert_eq!(runner.state().counts().crash, 1);
    assert_eq!(
        runner.state().messages(),
        ["LoadError: load => fixture missing (core)"]
    );
    assert_eq!(runner.sink().as_str(), "X");
}

#[test]
fn panic_is_contained() {
    let mut runner = quiet_runner();
    let c = runner.assert("index", "", |t| {
        let v: Vec<i32> = Vec::new();
        t.assert_equal(0, v[3]);
        Ok(())
    });
    assert_eq!(c, Classification::Crash);
    let message = &runner.state().messages()[0];
    assert!(message.starts_with("panic: index => index out of bounds"));

    // the suite keeps going
    assert_eq!(runner.assert("after", "", |_| Ok(())), Classification::Ok);
    assert_eq!(runner.sink().as_str(), "X.");
}

#[test]
fn crash_with_failures_recorded_is_still_a_crash() {
    let mut runner = quiet_runner();
    let c = runner.assert("mixed", "", |t| {
        t.assert_true(false);
        Err(Raised::new("TypeError", "no implicit conversion"))
    });
    assert_eq!(c, Classification::Crash);
    assert_eq!(
        runner.state().messages(),
        ["TypeError: mixed => no implicit conversion (core)"]
    );
}

#[test]
fn recorder_is_inert_after_block() {
    let mut runner = quiet_runner();
    runner.assert("first", "", |t| {
        t.assert_true(false);
        Ok(())
    });
    let before = runner.state().counts();
    let messages = runner.state().messages().len();

    assert!(!runner.recorder().assert_equal(1, 2));
    assert!(runner.recorder().failures().is_empty());
    assert_eq!(runner.state().counts(), before);
    assert_eq!(runner.state().messages().len(), messages);

    // a later block starts from an empty buffer
    assert_eq!(runner.assert("second", "", |_| Ok(())), Classification::Ok);
}

#[test]
fn extension_group_tag() {
    let config = Config::default()
        .with_timing(false)
        .with_group(Group::extension("sprintf"));
    let mut runner = Runner::new(config, OutputBuffer::new());
    runner.assert("format", "", |_| skip("pending"));
    assert_eq!(
        runner.state().messages(),
        ["Skip: format => pending (ext: sprintf)"]
    );
}

#[test]
fn messages_follow_invocation_order() {
    let mut runner = quiet_runner();
    for name in ["a", "b", "c"] {
        runner.assert(name, "", |_| skip(name));
    }
    let causes: Vec<_> = runner
        .state()
        .messages()
        .iter()
        .map(|m| m.split(" => ").nth(1).unwrap().to_string())
        .collect();
    assert_eq!(causes, ["a (core)", "b (core)", "c (core)"]);
}

#[test]
fn float_tolerance_from_config() {
    let config = Config::default().with_timing(false).with_tolerance(0.0001);
    let mut runner = Runner::new(config, OutputBuffer::new());
    assert_eq!(
        runner.assert("close", "", |t| {
            t.assert_float(1.0, 1.00001);
            Ok(())
        }),
        Classification::Ok
    );
    assert_eq!(
        runner.assert("far", "", |t| {
            t.assert_float(1.0, 1.01);
            Ok(())
        }),
        Classification::Fail
    );
    assert_eq!(
        runner.assert("infinite", "", |t| {
            t.assert_float(f64::INFINITY, 5.0);
            Ok(())
        }),
        Classification::Ok
    );
}

#[test]
fn io_and_fmt_errors_keep_distinct_kinds() {
    let mut runner = quiet_runner();
    runner.assert("read", "", |_| {
        std::fs::read("/nonexistent/assay/fixture")?;
        Ok(())
    });
    runner.assert("format", "", |_| Err(fmt::Error.into()));
    let messages = runner.state().messages();
    assert!(messages[0].starts_with("io::Error: read => "), "{}", messages[0]);
    assert!(messages[1].starts_with("fmt::Error: format => "), "{}", messages[1]);
}
