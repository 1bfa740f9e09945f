//! The assertion family and the pending buffer they record into.
//!
//! Every check returns its boolean result whether or not a buffer is active,
//! so checks can drive control flow inside a body. Only failures are stored,
//! but every check made while active consumes an index.

use crate::config::Config;
use crate::message::{assertion_diff, diff_text, inspect, raised_diff, type_label, Failure};
use crate::signal::{self, Raised};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::error::Error as StdError;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Actual value of a comparison: given directly or produced on demand.
pub enum Actual<'a, T> {
    Value(T),
    Lazy(Box<dyn FnOnce() -> T + 'a>),
}

impl<'a, T> Actual<'a, T> {
    pub fn lazy(supplier: impl FnOnce() -> T + 'a) -> Self {
        Actual::Lazy(Box::new(supplier))
    }

    /// Evaluates the supplier, if any. Consumes `self`, so it runs at most once.
    pub fn resolve(self) -> T {
        match self {
            Actual::Value(value) => value,
            Actual::Lazy(supplier) => supplier(),
        }
    }
}

impl<T> From<T> for Actual<'_, T> {
    fn from(value: T) -> Self {
        Actual::Value(value)
    }
}

/// Containment test used by `assert_include`.
pub trait Includes<T: ?Sized> {
    fn includes(&self, item: &T) -> bool;
}

impl<T: PartialEq> Includes<T> for [T] {
    fn includes(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq, const N: usize> Includes<T> for [T; N] {
    fn includes(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Includes<T> for Vec<T> {
    fn includes(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Includes<T> for VecDeque<T> {
    fn includes(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: Eq + Hash, S: BuildHasher> Includes<T> for HashSet<T, S> {
    fn includes(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: Ord> Includes<T> for BTreeSet<T> {
    fn includes(&self, item: &T) -> bool {
        self.contains(item)
    }
}

/// Maps include their keys.
impl<K: Eq + Hash, V, S: BuildHasher> Includes<K> for HashMap<K, V, S> {
    fn includes(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl<K: Ord, V> Includes<K> for BTreeMap<K, V> {
    fn includes(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl Includes<str> for str {
    fn includes(&self, item: &str) -> bool {
        self.contains(item)
    }
}

impl Includes<char> for str {
    fn includes(&self, item: &char) -> bool {
        self.contains(*item)
    }
}

impl Includes<str> for String {
    fn includes(&self, item: &str) -> bool {
        self.contains(item)
    }
}

impl Includes<char> for String {
    fn includes(&self, item: &char) -> bool {
        self.contains(*item)
    }
}

/// Numbers that `assert_float` can compare.
pub trait AsFloat {
    fn as_float(&self) -> f64;
}

macro_rules! as_float_lossy {
    ($($ty:ty),*) => {
        $(impl AsFloat for $ty {
            fn as_float(&self) -> f64 {
                *self as f64
            }
        })*
    };
}

as_float_lossy!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: AsFloat + ?Sized> AsFloat for &T {
    fn as_float(&self) -> f64 {
        (**self).as_float()
    }
}

/// Tolerance-bounded equality. Non-finite operands always compare equal.
pub fn check_float(a: impl AsFloat, b: impl AsFloat, tolerance: f64) -> bool {
    let a = a.as_float();
    let b = b.as_float();
    if a.is_finite() && b.is_finite() {
        (a - b).abs() < tolerance
    } else {
        true
    }
}

#[derive(Debug, Default)]
struct Pending {
    index: usize,
    failures: Vec<Failure>,
}

/// Records sub-checks made inside an `assert` block.
#[derive(Debug)]
pub struct Recorder {
    tolerance: f64,
    pending: Option<Pending>,
    next_message: Option<String>,
}

impl Recorder {
    pub fn new(config: &Config) -> Self {
        Self {
            tolerance: config.float_tolerance,
            pending: None,
            next_message: None,
        }
    }

    /// Whether checks are currently being recorded.
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Failures recorded so far in the active block.
    pub fn failures(&self) -> &[Failure] {
        self.pending
            .as_ref()
            .map(|p| p.failures.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn begin(&mut self) {
        self.pending = Some(Pending::default());
        self.next_message = None;
    }

    pub(crate) fn finish(&mut self) -> Vec<Failure> {
        self.next_message = None;
        self.pending.take().map(|p| p.failures).unwrap_or_default()
    }

    /// Replace the generated message of the next check, whichever it is.
    ///
    /// ```
    /// # use assay::{Config, Recorder};
    /// # let mut t = Recorder::new(&Config::default());
    /// t.message("greeting").assert_equal("hi", String::from("hi"));
    /// ```
    pub fn message(&mut self, message: impl Into<String>) -> &mut Self {
        self.next_message = Some(message.into());
        self
    }

    /// The primitive every other check delegates to.
    pub fn assert_true_with(
        &mut self,
        value: bool,
        message: Option<String>,
        diff: Option<String>,
    ) -> bool {
        let custom = self.next_message.take();
        if let Some(pending) = self.pending.as_mut() {
            pending.index += 1;
            if !value {
                let message = custom
                    .or(message)
                    .unwrap_or_else(|| format!("Expected {} to be true", value));
                let diff = diff.unwrap_or_else(|| assertion_diff(&true, &value));
                tracing::trace!(index = pending.index, %message, "check failed");
                pending.failures.push(Failure {
                    index: pending.index,
                    message,
                    diff,
                });
            }
        }
        value
    }

    pub fn assert_true(&mut self, value: bool) -> bool {
        self.assert_true_with(value, None, None)
    }

    /// Returns whether the check passed, i.e. `!value`.
    pub fn assert_false(&mut self, value: bool) -> bool {
        let (message, diff) = if value {
            (
                Some("Expected true to be false".to_string()),
                Some(assertion_diff(&false, &value)),
            )
        } else {
            (None, None)
        };
        self.assert_true_with(!value, message, diff)
    }

    pub fn assert_equal<E, A>(&mut self, expected: E, actual: A) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug,
    {
        self.equality(expected, Actual::Value(actual), true)
    }

    /// `assert_equal` with an actual value computed by `supplier`.
    pub fn assert_equal_with<'a, E, A>(&mut self, expected: E, supplier: impl FnOnce() -> A + 'a) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug + 'a,
    {
        self.equality(expected, Actual::lazy(supplier), true)
    }

    pub fn assert_not_equal<E, A>(&mut self, expected: E, actual: A) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug,
    {
        self.equality(expected, Actual::Value(actual), false)
    }

    pub fn assert_not_equal_with<'a, E, A>(
        &mut self,
        expected: E,
        supplier: impl FnOnce() -> A + 'a,
    ) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug + 'a,
    {
        self.equality(expected, Actual::lazy(supplier), false)
    }

    fn equality<E, A>(&mut self, expected: E, actual: Actual<'_, A>, want_equal: bool) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug,
    {
        let actual = actual.resolve();
        let equal = expected == actual;
        if equal == want_equal {
            return self.assert_true_with(true, None, None);
        }
        let message = if want_equal {
            "Expected to be equal"
        } else {
            "Expected to be not equal"
        };
        self.assert_true_with(
            false,
            Some(message.to_string()),
            Some(assertion_diff(&expected, &actual)),
        )
    }

    /// Identity: both references point at the same value in memory.
    pub fn assert_same<T: Debug + ?Sized>(&mut self, expected: &T, actual: &T) -> bool {
        self.identity(expected, actual, true)
    }

    pub fn assert_not_same<T: Debug + ?Sized>(&mut self, expected: &T, actual: &T) -> bool {
        self.identity(expected, actual, false)
    }

    fn identity<T: Debug + ?Sized>(&mut self, expected: &T, actual: &T, want_same: bool) -> bool {
        let same = std::ptr::eq(expected, actual);
        if same == want_same {
            return self.assert_true_with(true, None, None);
        }
        let relation = if want_same { "to be" } else { "to not be" };
        let message = format!(
            "Expected {} {} the same object as {}",
            inspect(actual),
            relation,
            inspect(expected)
        );
        let diff = format!(
            "    Expected: {:?} (type={}, addr={:p})\n      Actual: {:?} (type={}, addr={:p})",
            expected,
            type_label::<T>(),
            expected,
            actual,
            type_label::<T>(),
            actual
        );
        self.assert_true_with(false, Some(message), Some(diff))
    }

    pub fn assert_nil<T: Debug>(&mut self, value: &Option<T>) -> bool {
        if value.is_none() {
            return self.assert_true_with(true, None, None);
        }
        let shown = inspect(value);
        let message = format!("Expected {} to be nil", shown);
        self.assert_true_with(false, Some(message), Some(diff_text("nil", &shown)))
    }

    pub fn assert_include<C, T>(&mut self, collection: &C, item: &T) -> bool
    where
        C: Includes<T> + Debug + ?Sized,
        T: Debug + ?Sized,
    {
        self.containment(collection, item, true)
    }

    pub fn assert_not_include<C, T>(&mut self, collection: &C, item: &T) -> bool
    where
        C: Includes<T> + Debug + ?Sized,
        T: Debug + ?Sized,
    {
        self.containment(collection, item, false)
    }

    fn containment<C, T>(&mut self, collection: &C, item: &T, want_included: bool) -> bool
    where
        C: Includes<T> + Debug + ?Sized,
        T: Debug + ?Sized,
    {
        if collection.includes(item) == want_included {
            return self.assert_true_with(true, None, None);
        }
        let relation = if want_included {
            "to include"
        } else {
            "to not include"
        };
        let message = format!(
            "Expected {} {} {}",
            inspect(collection),
            relation,
            inspect(item)
        );
        let diff = format!(
            "    Collection: {:?}\n        Object: {:?}",
            collection, item
        );
        self.assert_true_with(false, Some(message), Some(diff))
    }

    /// Passes when the runtime type of `value` is `K`. For a `dyn Any` the
    /// concrete type behind it is compared, but a failure can only report
    /// that some other type sits behind the trait object.
    pub fn assert_kind_of<K, V>(&mut self, value: &V) -> bool
    where
        K: ?Sized + 'static,
        V: ?Sized + Any + Debug,
    {
        if Any::type_id(value) == TypeId::of::<K>() {
            return self.assert_true_with(true, None, None);
        }
        let expected = type_label::<K>();
        let mut actual = type_label::<V>();
        if actual.starts_with("dyn ") {
            actual = format!("another type behind {}", actual);
        }
        let message = format!(
            "Expected {} to be a kind of {}, not {}",
            inspect(value),
            expected,
            actual
        );
        self.assert_true_with(false, Some(message), Some(diff_text(&expected, &actual)))
    }

    /// `check_float` with the configured tolerance.
    pub fn check_float(&self, a: impl AsFloat, b: impl AsFloat) -> bool {
        check_float(a, b, self.tolerance)
    }

    pub fn assert_float<E, A>(&mut self, expected: E, actual: A) -> bool
    where
        E: AsFloat + Debug,
        A: AsFloat + Debug,
    {
        if self.check_float(&expected, &actual) {
            return self.assert_true_with(true, None, None);
        }
        let message = format!(
            "Float {:?} expected to be equal to float {:?}",
            expected, actual
        );
        self.assert_true_with(false, Some(message), Some(assertion_diff(&expected, &actual)))
    }

    /// Passes when `body` raises an `E`. Panics inside `body` are caught.
    pub fn assert_raise<E, T>(&mut self, body: impl FnOnce() -> Result<T, Raised>) -> bool
    where
        E: StdError + 'static,
    {
        self.expect_raise(&type_label::<E>(), |raised| raised.is::<E>(), None, body)
    }

    /// Passes when `body` raises something of the named kind, as reported by
    /// [`Raised::kind`]. Use `"panic"` to expect a panic.
    pub fn assert_raise_kind<T>(
        &mut self,
        kind: &str,
        body: impl FnOnce() -> Result<T, Raised>,
    ) -> bool {
        self.expect_raise(kind, |raised| raised.kind() == kind, None, body)
    }

    /// `assert_raise` that also requires the raised message to equal `expected_message`.
    pub fn assert_raise_with_message<E, T>(
        &mut self,
        expected_message: &str,
        body: impl FnOnce() -> Result<T, Raised>,
    ) -> bool
    where
        E: StdError + 'static,
    {
        self.expect_raise(
            &type_label::<E>(),
            |raised| raised.is::<E>(),
            Some(expected_message),
            body,
        )
    }

    fn expect_raise<T>(
        &mut self,
        expected: &str,
        matches: impl Fn(&Raised) -> bool,
        expected_message: Option<&str>,
        body: impl FnOnce() -> Result<T, Raised>,
    ) -> bool {
        match signal::catch(body) {
            Err(raised) if matches(&raised) => match expected_message {
                Some(text) if raised.message() != text => {
                    let message = format!("Expected {} to have message {:?}", expected, text);
                    let diff = assertion_diff(text, &raised.message());
                    self.assert_true_with(false, Some(message), Some(diff))
                }
                _ => self.assert_true(true),
            },
            Err(raised) => {
                let message = format!("Expected to raise {}, not", expected);
                let diff = raised_diff(raised.kind(), &raised.message());
                self.assert_true_with(false, Some(message), Some(diff))
            }
            Ok(_) => {
                let message = format!("Expected to raise {} but nothing was raised.", expected);
                self.assert_true_with(false, Some(message), Some(String::new()))
            }
        }
    }

    pub fn assert_nothing_raised<T>(&mut self, body: impl FnOnce() -> Result<T, Raised>) -> bool {
        match signal::catch(body) {
            Ok(_) => self.assert_true(true),
            Err(raised) => {
                let message = format!("Expected not to raise {} but it raised", raised.message());
                let diff = raised_diff(raised.kind(), &raised.message());
                self.assert_true_with(false, Some(message), Some(diff))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn active() -> Recorder {
        let mut recorder = Recorder::new(&Config::default().with_tolerance(0.0001));
        recorder.begin();
        recorder
    }

    #[test]
    fn inactive_recorder_still_returns_result() {
        let mut t = Recorder::new(&Config::default());
        assert!(!t.assert_true(false));
        assert!(t.assert_equal(1, 1));
        assert!(!t.is_active());
        assert!(t.failures().is_empty());
        assert!(t.finish().is_empty());
    }

    #[test]
    fn indices_count_passing_checks() {
        let mut t = active();
        t.assert_true(true);
        t.assert_equal(4, 2 + 3);
        t.assert_true(true);
        t.assert_false(true);
        let failures = t.finish();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 2);
        assert_eq!(failures[0].message, "Expected to be equal");
        assert_eq!(failures[0].diff, "    Expected: 4\n      Actual: 5");
        assert_eq!(failures[1].index, 4);
        assert_eq!(failures[1].message, "Expected true to be false");
        assert_eq!(failures[1].diff, "    Expected: false\n      Actual: true");
        assert!(!t.is_active());
    }

    #[test]
    fn assert_true_defaults() {
        let mut t = active();
        assert!(!t.assert_true(false));
        let failures = t.finish();
        assert_eq!(failures[0].message, "Expected false to be true");
        assert_eq!(failures[0].diff, "    Expected: true\n      Actual: false");
    }

    #[test]
    fn assert_false_returns_inverse() {
        let mut t = active();
        assert!(t.assert_false(false));
        assert!(!t.assert_false(true));
    }

    #[test]
    fn custom_message_applies_once() {
        let mut t = active();
        t.message("lengths differ").assert_equal(3, 4);
        t.assert_equal(1, 2);
        let failures = t.finish();
        assert_eq!(failures[0].message, "lengths differ");
        assert_eq!(failures[1].message, "Expected to be equal");
    }

    #[test]
    fn custom_message_consumed_by_passing_check() {
        let mut t = active();
        t.message("unused").assert_true(true);
        t.assert_true(false);
        assert_eq!(t.finish()[0].message, "Expected false to be true");
    }

    #[test]
    fn lazy_actual_runs_once() {
        let calls = Cell::new(0);
        let mut t = active();
        assert!(t.assert_equal_with(4, || {
            calls.set(calls.get() + 1);
            2 + 2
        }));
        assert_eq!(calls.get(), 1);
        assert!(t.assert_not_equal_with(4, || 5));
    }

    #[test]
    fn not_equal_failure() {
        let mut t = active();
        assert!(!t.assert_not_equal("a", "a"));
        let failures = t.finish();
        assert_eq!(failures[0].message, "Expected to be not equal");
    }

    #[test]
    fn identity_checks() {
        let a = String::from("x");
        let b = String::from("x");
        let mut t = active();
        assert!(t.assert_same(&a, &a));
        assert!(!t.assert_same(&a, &b));
        assert!(t.assert_not_same(&a, &b));
        assert!(!t.assert_not_same(&b, &b));
        let failures = t.finish();
        assert_eq!(
            failures[0].message,
            "Expected \"x\" to be the same object as \"x\""
        );
        assert!(failures[0].diff.contains("(type=String, addr=0x"));
        assert_eq!(
            failures[1].message,
            "Expected \"x\" to not be the same object as \"x\""
        );
    }

    #[test]
    fn nil_checks() {
        let mut t = active();
        assert!(t.assert_nil::<i32>(&None));
        assert!(!t.assert_nil(&Some(3)));
        let failures = t.finish();
        assert_eq!(failures[0].message, "Expected Some(3) to be nil");
        assert_eq!(failures[0].diff, "    Expected: nil\n      Actual: Some(3)");
    }

    #[test]
    fn containment() {
        let mut t = active();
        assert!(t.assert_include(&vec![1, 2, 3], &2));
        assert!(t.assert_include("hello", "ell"));
        assert!(t.assert_include(&String::from("abc"), &'b'));
        assert!(t.assert_not_include(&[1, 2], &5));
        let keys: HashMap<&str, i32> = [("a", 1)].into_iter().collect();
        assert!(t.assert_include(&keys, &"a"));
        assert!(t.assert_include(&BTreeSet::from([3, 4]), &4));
        assert!(t.failures().is_empty());

        assert!(!t.assert_include(&vec![1, 2], &9));
        assert!(!t.assert_not_include("abc", "b"));
        let failures = t.finish();
        assert_eq!(failures[0].message, "Expected [1, 2] to include 9");
        assert_eq!(failures[0].diff, "    Collection: [1, 2]\n        Object: 9");
        assert_eq!(failures[1].message, "Expected \"abc\" to not include \"b\"");
    }

    #[test]
    fn kind_of() {
        let mut t = active();
        assert!(t.assert_kind_of::<i32, _>(&5));
        assert!(!t.assert_kind_of::<String, _>(&5u8));
        let boxed: Box<dyn Any> = Box::new(String::from("s"));
        assert!(t.assert_kind_of::<String, dyn Any>(boxed.as_ref()));
        let failures = t.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "Expected 5 to be a kind of String, not u8");
        assert_eq!(failures[0].diff, "    Expected: String\n      Actual: u8");
    }

    #[test]
    fn kind_of_failure_behind_dyn_any() {
        let mut t = active();
        let boxed: Box<dyn Any> = Box::new(3i64);
        assert!(!t.assert_kind_of::<u8, dyn Any>(boxed.as_ref()));
        let failures = t.finish();
        assert_eq!(
            failures[0].message,
            "Expected Any { .. } to be a kind of u8, not another type behind dyn Any"
        );
        assert_eq!(
            failures[0].diff,
            "    Expected: u8\n      Actual: another type behind dyn Any"
        );
    }

    #[test]
    fn float_tolerance() {
        assert!(check_float(1.0, 1.00001, 0.0001));
        assert!(!check_float(1.0, 1.01, 0.0001));
        assert!(check_float(f64::INFINITY, 5.0, 0.0001));
        assert!(check_float(f64::NAN, f64::NAN, 0.0001));
        assert!(check_float(1, 1.0f32, 0.0001));

        let mut t = active();
        assert!(t.assert_float(1.0, 1.00001));
        assert!(!t.assert_float(1.0, 1.5));
        let failures = t.finish();
        assert_eq!(failures[0].message, "Float 1.0 expected to be equal to float 1.5");
        assert_eq!(failures[0].diff, "    Expected: 1.0\n      Actual: 1.5");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("wrong argument")]
    struct ArgumentError;

    #[derive(Debug, thiserror::Error)]
    #[error("out of range")]
    struct RangeError;

    #[test]
    fn raise_expectations() {
        let mut t = active();
        assert!(t.assert_raise::<ArgumentError, ()>(|| Err(ArgumentError.into())));
        assert!(!t.assert_raise::<ArgumentError, ()>(|| Ok(())));
        assert!(!t.assert_raise::<ArgumentError, ()>(|| Err(RangeError.into())));
        let failures = t.finish();
        assert_eq!(
            failures[0].message,
            "Expected to raise ArgumentError but nothing was raised."
        );
        assert_eq!(failures[0].diff, "");
        assert_eq!(failures[1].message, "Expected to raise ArgumentError, not");
        assert_eq!(
            failures[1].diff,
            "      Class: <RangeError>\n    Message: out of range"
        );
    }

    #[test]
    fn raise_kind_matches_panics() {
        let mut t = active();
        assert!(t.assert_raise_kind::<()>("panic", || panic!("bad")));
        assert!(t.assert_raise_kind::<()>("ArgumentError", || Err(Raised::new("ArgumentError", "x"))));
        assert!(t.failures().is_empty());
    }

    #[test]
    fn raise_with_message() {
        let mut t = active();
        assert!(t.assert_raise_with_message::<ArgumentError, ()>("wrong argument", || {
            Err(ArgumentError.into())
        }));
        assert!(!t.assert_raise_with_message::<ArgumentError, ()>("other", || {
            Err(ArgumentError.into())
        }));
        let failures = t.finish();
        assert_eq!(
            failures[0].message,
            "Expected ArgumentError to have message \"other\""
        );
    }

    #[test]
    fn nothing_raised() {
        let mut t = active();
        assert!(t.assert_nothing_raised(|| Ok::<_, Raised>(1)));
        assert!(!t.assert_nothing_raised::<()>(|| Err(RangeError.into())));
        let failures = t.finish();
        assert_eq!(failures[0].message, "Expected not to raise out of range but it raised");
    }
}
