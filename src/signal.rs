//! Raised conditions and the failure boundary around test bodies.
//!
//! A test body returns `Result<(), Raised>`. Any `std::error::Error` converts
//! into a [`Raised`] through `?`, and [`skip`] produces the one distinguished
//! condition that classifies a test as skipped rather than crashed. Panics
//! are caught by [`catch`] and surface as a `Raised` of kind `panic`.

use crate::message::type_label;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Kind reported for panics caught at the boundary.
pub const PANIC_KIND: &str = "panic";

/// Voluntary early exit from a test body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{cause}")]
pub struct SkipSignal {
    cause: String,
}

impl SkipSignal {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// End the current test body as skipped.
///
/// ```
/// use assay::{skip, Raised};
///
/// fn body(has_float: bool) -> Result<(), Raised> {
///     if !has_float {
///         skip("float support disabled")?;
///     }
///     Ok(())
/// }
/// assert!(body(false).unwrap_err().is_skip());
/// ```
pub fn skip(cause: impl Into<String>) -> Result<(), Raised> {
    Err(Raised::skip(cause))
}

/// Anything that escaped a test body.
///
/// Does not implement `std::error::Error`; every error type converts into it
/// with `?`.
pub struct Raised {
    repr: Repr,
}

enum Repr {
    Skip(SkipSignal),
    Error {
        kind: String,
        error: Box<dyn StdError + Send + Sync>,
        backtrace: Backtrace,
    },
    Message {
        kind: String,
        message: String,
        location: Option<String>,
        backtrace: Option<Backtrace>,
    },
}

impl Raised {
    pub fn skip(cause: impl Into<String>) -> Self {
        Self {
            repr: Repr::Skip(SkipSignal::new(cause)),
        }
    }

    /// An ad-hoc failure with an explicit kind, for bodies that have no
    /// dedicated error type at hand.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            repr: Repr::Message {
                kind: kind.into(),
                message: message.into(),
                location: None,
                backtrace: Some(Backtrace::capture()),
            },
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.repr, Repr::Skip(_))
    }

    pub fn skip_cause(&self) -> Option<&str> {
        match &self.repr {
            Repr::Skip(signal) => Some(signal.cause()),
            _ => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(&self.repr, Repr::Message { kind, .. } if kind == PANIC_KIND)
    }

    /// Short type name of the raised error, `panic` for caught panics.
    pub fn kind(&self) -> &str {
        match &self.repr {
            Repr::Skip(_) => "SkipSignal",
            Repr::Error { kind, .. } | Repr::Message { kind, .. } => kind.as_str(),
        }
    }

    pub fn message(&self) -> String {
        match &self.repr {
            Repr::Skip(signal) => signal.cause().to_string(),
            Repr::Error { error, .. } => error.to_string(),
            Repr::Message { message, .. } => message.clone(),
        }
    }

    /// Whether the raised condition is an `E`.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        match &self.repr {
            Repr::Skip(_) => TypeId::of::<E>() == TypeId::of::<SkipSignal>(),
            Repr::Error { error, .. } => error.is::<E>(),
            Repr::Message { .. } => false,
        }
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match &self.repr {
            Repr::Error { error, .. } => error.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Backtrace frames, one per line, with the panic location first when
    /// one is known. Frames are only captured when `RUST_BACKTRACE` is set.
    pub fn backtrace_lines(&self) -> Vec<String> {
        let (location, backtrace) = match &self.repr {
            Repr::Skip(_) => return Vec::new(),
            Repr::Error { backtrace, .. } => (None, Some(backtrace)),
            Repr::Message {
                location,
                backtrace,
                ..
            } => (location.as_deref(), backtrace.as_ref()),
        };
        let mut lines: Vec<String> = location.map(|l| format!("at {}", l)).into_iter().collect();
        let captured = backtrace.filter(|b| b.status() == BacktraceStatus::Captured);
        if let Some(backtrace) = captured {
            lines.extend(
                backtrace
                    .to_string()
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }
        lines
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        let site = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let (location, backtrace) = match site {
            Some(site) => (site.location, Some(site.backtrace)),
            None => (None, None),
        };
        Self {
            repr: Repr::Message {
                kind: PANIC_KIND.to_string(),
                message,
                location,
                backtrace,
            },
        }
    }
}

impl<E> From<E> for Raised
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(error);
        match boxed.downcast::<SkipSignal>() {
            Ok(signal) => Self {
                repr: Repr::Skip(*signal),
            },
            Err(error) => Self {
                repr: Repr::Error {
                    kind: type_label::<E>(),
                    error,
                    backtrace: Backtrace::capture(),
                },
            },
        }
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Skip(signal) => f.debug_tuple("Skip").field(&signal.cause()).finish(),
            _ => f
                .debug_struct("Raised")
                .field("kind", &self.kind())
                .field("message", &self.message())
                .finish(),
        }
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

// ============================================================================
// FAILURE BOUNDARY
// ============================================================================

struct PanicSite {
    location: Option<String>,
    backtrace: Backtrace,
}

thread_local! {
    static CATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

/// Panics on a thread that is inside [`catch`] are recorded quietly; all
/// others go to whatever hook was installed before.
static QUIET_HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if CATCH_DEPTH.with(Cell::get) > 0 {
            let site = PanicSite {
                location: info.location().map(|l| l.to_string()),
                backtrace: Backtrace::capture(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(site));
        } else {
            previous(info);
        }
    }));
});

/// Run `body`, turning a panic into a `Raised`. Returned errors pass through.
pub fn catch<T>(body: impl FnOnce() -> Result<T, Raised>) -> Result<T, Raised> {
    Lazy::force(&QUIET_HOOK);
    CATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(body));
    CATCH_DEPTH.with(|depth| depth.set(depth.get() - 1));
    match result {
        Ok(result) => result,
        Err(payload) => Err(Raised::from_panic(payload)),
    }
}
