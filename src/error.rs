//! Tagged errors and exhaustive-with-fallback dispatch.
//!
//! Layers loaded into the platform are written independently, so the error
//! space is open: each producer mints its own tags and no single enum can
//! enumerate them all. Consumers still need a total way to branch on what
//! they receive. The contract here is:
//!
//! - Every expected error carries an immutable string tag ([`TaggedError`]).
//! - Cross-layer boundaries carry errors as [`TagError`] values (tag,
//!   message, and any contributing causes).
//! - Consumption goes through [`dispatch`], which pairs per-tag handlers
//!   with a mandatory fallback. New tags added elsewhere in the system never
//!   make an existing call site partial; they land in the fallback.
//!
//! Closed-world exhaustiveness is traded away on purpose: a subsystem that
//! owns its whole error space should use an ordinary `enum` and `match`
//! instead.

use std::borrow::Cow;
use std::fmt;

/// Tag carried by errors produced when both a computation and its
/// finalizer fail. See [`Combine`] and
/// [`Outcome::and_finally`](crate::outcome::Outcome::and_finally).
pub const COMBINED_ERROR_TAG: &str = "CombinedError";

/// An expected error with an immutable string discriminant.
///
/// The tag is the unit of dispatch: two errors with the same tag are the
/// same kind of failure as far as callers are concerned, whatever their
/// concrete type.
pub trait TaggedError: std::error::Error {
    /// Returns the immutable tag identifying this kind of error.
    fn tag(&self) -> &str;
}

/// Open, tagged error value for cross-layer boundaries.
///
/// `TagError` is plain data: a tag, a human-readable message, and zero or
/// more causes. It is the lingua franca between layers that do not share
/// error enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    tag: Cow<'static, str>,
    message: String,
    causes: Vec<TagError>,
}

impl TagError {
    /// Creates an error with the given tag and message.
    #[must_use]
    pub fn new(tag: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Creates the combined error for a computation and its finalizer both
    /// failing. Both causes are retained; neither is dropped.
    #[must_use]
    pub fn combined(program: Self, finalization: Self) -> Self {
        Self {
            tag: Cow::Borrowed(COMBINED_ERROR_TAG),
            message: format!("{program}; during finalization: {finalization}"),
            causes: vec![program, finalization],
        }
    }

    /// Returns the tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the contributing causes, if any.
    #[must_use]
    pub fn causes(&self) -> &[TagError] {
        &self.causes
    }
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tag, self.message)
    }
}

impl std::error::Error for TagError {}

impl TaggedError for TagError {
    fn tag(&self) -> &str {
        &self.tag
    }
}

/// Merging of a program error with a finalization error.
///
/// `and_finally` must never discard a cause: when both the main computation
/// and its finalizer fail, the two errors are combined into one value of the
/// same type. [`TagError`] ships the canonical implementation (tag
/// `"CombinedError"`); closed subsystem enums opt in with a combined
/// variant of their own.
pub trait Combine: Sized {
    /// Merges the two errors, preserving both causes.
    fn combine(program: Self, finalization: Self) -> Self;
}

impl Combine for TagError {
    fn combine(program: Self, finalization: Self) -> Self {
        Self::combined(program, finalization)
    }
}

/// Starts an exhaustive-with-fallback dispatch over a tagged error.
///
/// Arms are tried in registration order; the first arm whose tag equals
/// `error.tag()` wins. The fallback is mandatory: only
/// [`Dispatch::or_else`] evaluates the dispatch, so a call site cannot
/// forget to handle unknown tags.
///
/// # Example
///
/// ```
/// use interlay::error::{TagError, dispatch};
///
/// let err = TagError::new("ConfigMissing", "no site.yaml found");
/// let exit_code = dispatch(&err)
///     .on("ConfigMissing", |_| 2)
///     .on("ValidationError", |_| 3)
///     .or_else(|_| 1);
/// assert_eq!(exit_code, 2);
/// ```
pub fn dispatch<E: TaggedError + ?Sized, T>(error: &E) -> Dispatch<'_, E, T> {
    Dispatch {
        error,
        arms: Vec::new(),
    }
}

/// Builder returned by [`dispatch`].
#[must_use = "a dispatch does nothing until or_else runs it"]
pub struct Dispatch<'e, E: ?Sized, T> {
    error: &'e E,
    arms: Vec<Arm<'e, E, T>>,
}

type Arm<'e, E, T> = (&'static str, Box<dyn FnOnce(&'e E) -> T + 'e>);

impl<'e, E: TaggedError + ?Sized, T> Dispatch<'e, E, T> {
    /// Registers a handler for one tag. The first matching arm wins.
    pub fn on(mut self, tag: &'static str, handler: impl FnOnce(&'e E) -> T + 'e) -> Self {
        self.arms.push((tag, Box::new(handler)));
        self
    }

    /// Runs the dispatch: the matching arm if any, the fallback otherwise.
    pub fn or_else(self, fallback: impl FnOnce(&'e E) -> T) -> T {
        let tag = self.error.tag();
        for (arm_tag, handler) in self.arms {
            if arm_tag == tag {
                return handler(self.error);
            }
        }
        fallback(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(tag: &'static str) -> TagError {
        TagError::new(tag, "test error")
    }

    #[test]
    fn dispatch_hits_matching_arm() {
        let e = err("ValidationError");
        let picked = dispatch(&e)
            .on("ConfigMissing", |_| "config")
            .on("ValidationError", |_| "validation")
            .or_else(|_| "fallback");
        assert_eq!(picked, "validation");
    }

    #[test]
    fn dispatch_falls_back_on_unknown_tag() {
        let e = err("SpawnError");
        let picked = dispatch(&e)
            .on("ConfigMissing", |_| "config".to_string())
            .or_else(|e| e.tag().to_string());
        assert_eq!(picked, "SpawnError");
    }

    #[test]
    fn dispatch_first_matching_arm_wins() {
        let e = err("ConfigMissing");
        let picked = dispatch(&e)
            .on("ConfigMissing", |_| 1)
            .on("ConfigMissing", |_| 2)
            .or_else(|_| 0);
        assert_eq!(picked, 1);
    }

    #[test]
    fn dispatch_handler_sees_the_error() {
        let e = TagError::new("ConfigMissing", "no site.yaml found");
        let message = dispatch(&e)
            .on("ConfigMissing", TagError::message)
            .or_else(|_| "");
        assert_eq!(message, "no site.yaml found");
    }

    #[test]
    fn combined_error_keeps_both_causes() {
        let program = err("ValidationError");
        let finalization = err("SpawnError");
        let combined = TagError::combined(program.clone(), finalization.clone());
        assert_eq!(combined.tag(), COMBINED_ERROR_TAG);
        assert_eq!(combined.causes(), &[program, finalization]);
    }

    #[test]
    fn combine_trait_matches_combined_constructor() {
        let a = err("A");
        let b = err("B");
        assert_eq!(
            TagError::combine(a.clone(), b.clone()),
            TagError::combined(a, b)
        );
    }

    #[test]
    fn display_includes_tag_and_message() {
        let e = TagError::new("ConfigMissing", "no site.yaml found");
        assert_eq!(e.to_string(), "ConfigMissing: no site.yaml found");
    }
}
