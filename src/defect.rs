//! Defect payloads: opaque descriptions of unexpected errors.
//!
//! A defect is an error nobody planned for: a panic inside a combinator
//! callback, a poisoned invariant, an interpreter bug. Defects are carried
//! by [`Outcome::Defect`](crate::outcome::Outcome) and bypass every ordinary
//! failure-handling path; the only way to observe one is a dedicated defect
//! hook or the three-way terminal observer.
//!
//! The payload deliberately keeps only a best-effort description of the
//! original cause. Panic payloads are not `Clone` and not `Sync`, so carrying
//! them verbatim would poison the whole `Outcome` type; extracting the
//! message up front keeps defects cheap to clone and safe to send across
//! threads while preserving everything a log line needs.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Description of a panic payload with no recognizable message.
const OPAQUE_PANIC: &str = "opaque panic payload";

/// Opaque, cloneable description of an unexpected error.
///
/// Constructed at the boundaries where raw, panicking code meets the
/// `Outcome` world: `capture*` constructors, combinator callbacks, the
/// program interpreter, and port handler invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectPayload {
    message: String,
}

impl DefectPayload {
    /// Creates a payload from an explicit message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a payload from a caught panic.
    ///
    /// `&str` and `String` payloads (the overwhelming majority, produced by
    /// `panic!` with a message) are extracted verbatim; anything else is
    /// recorded as opaque.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<&'static str>() {
            Ok(s) => (*s).to_string(),
            Err(payload) => match payload.downcast::<String>() {
                Ok(s) => *s,
                Err(_) => OPAQUE_PANIC.to_string(),
            },
        };
        Self { message }
    }

    /// Creates a payload from a displayable error.
    ///
    /// Used when a fallible boundary has no error mapper: the error was not
    /// recognized as an expected failure condition, so it surfaces as a
    /// defect rather than being silently promoted to a `Failure`.
    #[must_use]
    pub fn from_display(error: impl fmt::Display) -> Self {
        Self {
            message: error.to_string(),
        }
    }

    /// Returns the best-effort description of the original cause.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DefectPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "defect: {}", self.message)
    }
}

/// Runs `f`, converting a panic into a [`DefectPayload`].
///
/// This is the single panic boundary for the whole crate: every user
/// callback handed to a combinator runs under it.
pub(crate) fn catch<T>(f: impl FnOnce() -> T) -> Result<T, DefectPayload> {
    catch_unwind(AssertUnwindSafe(f)).map_err(DefectPayload::from_panic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_panic_message_extracted() {
        let err = catch(|| panic!("boom")).unwrap_err();
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn formatted_panic_message_extracted() {
        let code = 7;
        let err = catch(|| panic!("bad code {code}")).unwrap_err();
        assert_eq!(err.message(), "bad code 7");
    }

    #[test]
    fn non_string_panic_is_opaque() {
        let err = catch(|| std::panic::panic_any(42_u32)).unwrap_err();
        assert_eq!(err.message(), OPAQUE_PANIC);
    }

    #[test]
    fn successful_call_passes_value_through() {
        let value = catch(|| 5).expect("no panic");
        assert_eq!(value, 5);
    }

    #[test]
    fn display_includes_message() {
        let payload = DefectPayload::msg("wires crossed");
        assert_eq!(payload.to_string(), "defect: wires crossed");
    }
}
