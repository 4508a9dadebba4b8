//! Tri-state effect outcomes and their combinator algebra.
//!
//! An [`Outcome`] is the terminal value of one fallible step: a produced
//! value, an expected typed failure, or an unexpected defect. The three
//! branches are mutually exclusive and exhaustive, and the defect branch is
//! deliberately unreachable from ordinary error handling:
//!
//! - **Success** flows through `map`/`and_then` chains.
//! - **Failure** is a value the caller is meant to branch on. It propagates
//!   untouched until explicitly recovered.
//! - **Defect** is a bug surfacing: a panic in a callback, an unmapped error
//!   at a capture boundary. No combinator converts a defect into a failure;
//!   defects can only be created, never demoted.
//!
//! Any panic inside a transformer, consumer, or predicate handed to a
//! combinator is caught and becomes a defect, never a domain failure.
//! Callers terminate chains with the three-way observer [`Outcome::fold`];
//! collapsing to a two-way success/failure split loses the signal that a
//! defect is a bug to escalate, not business as usual.
//!
//! # Example
//!
//! ```
//! use interlay::error::TagError;
//! use interlay::outcome::Outcome;
//!
//! fn parse_limit(raw: &str) -> Outcome<u32, TagError> {
//!     Outcome::capture_fallible(
//!         || raw.trim().parse::<u32>(),
//!         |e| TagError::new("ValidationError", format!("bad limit: {e}")),
//!     )
//! }
//!
//! let doubled = parse_limit(" 12 ").and_then(|n| Outcome::success(n * 2));
//! assert_eq!(doubled, Outcome::success(24));
//!
//! let bad = parse_limit("many");
//! assert!(bad.as_failure().is_some_and(|f| f.error().tag() == "ValidationError"));
//! ```

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_lite::FutureExt;
use smallvec::SmallVec;

use crate::defect::{self, DefectPayload};
use crate::error::Combine;

/// A typed, expected failure together with the errors suppressed along the
/// way by failed recovery attempts.
///
/// Most failures carry no suppressed errors; the list only grows when a
/// [`recover`](Outcome::recover) handler itself fails, keeping the error it
/// was asked to recover from instead of silently dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed<E> {
    error: E,
    suppressed: SmallVec<[E; 1]>,
}

impl<E> Failed<E> {
    /// Wraps a bare error with no suppressed history.
    #[must_use]
    pub fn new(error: E) -> Self {
        Self {
            error,
            suppressed: SmallVec::new(),
        }
    }

    /// Wraps an error together with previously suppressed errors,
    /// earliest first.
    #[must_use]
    pub fn with_suppressed(error: E, suppressed: Vec<E>) -> Self {
        Self {
            error,
            suppressed: SmallVec::from_vec(suppressed),
        }
    }

    /// Returns the primary error.
    #[must_use]
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Returns the suppressed errors, earliest first.
    #[must_use]
    pub fn suppressed(&self) -> &[E] {
        &self.suppressed
    }

    /// Consumes the failure, returning the primary error and dropping the
    /// suppressed history.
    #[must_use]
    pub fn into_error(self) -> E {
        self.error
    }

    /// Consumes the failure, returning the primary error and the suppressed
    /// history.
    #[must_use]
    pub fn into_parts(self) -> (E, Vec<E>) {
        (self.error, self.suppressed.into_vec())
    }

    /// Maps the primary error and every suppressed error.
    pub(crate) fn map<F>(self, mut f: impl FnMut(E) -> F) -> Failed<F> {
        Failed {
            error: f(self.error),
            suppressed: self.suppressed.into_iter().map(&mut f).collect(),
        }
    }

    /// Inserts earlier suppressed errors ahead of the current ones.
    pub(crate) fn prepend_suppressed(&mut self, mut earlier: Vec<E>) {
        earlier.extend(self.suppressed.drain(..));
        self.suppressed = SmallVec::from_vec(earlier);
    }
}

impl<E: fmt::Display> fmt::Display for Failed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if !self.suppressed.is_empty() {
            write!(f, " ({} suppressed)", self.suppressed.len())?;
        }
        Ok(())
    }
}

/// Terminal result of one fallible, possibly asynchronous step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an outcome carries a failure or defect branch that must be observed"]
pub enum Outcome<R, E> {
    /// A produced value.
    Success(R),
    /// A typed, expected error the caller is meant to branch on.
    Failure(Failed<E>),
    /// An unforeseen error that bypasses ordinary failure handling.
    Defect(DefectPayload),
}

impl<R, E> Outcome<R, E> {
    /// Creates a success.
    #[must_use]
    pub fn success(value: R) -> Self {
        Self::Success(value)
    }

    /// Creates a failure with no suppressed history.
    #[must_use]
    pub fn failure(error: E) -> Self {
        Self::Failure(Failed::new(error))
    }

    /// Creates a defect.
    #[must_use]
    pub fn defect(payload: DefectPayload) -> Self {
        Self::Defect(payload)
    }

    /// Converts a plain `Result` into an outcome.
    #[must_use]
    pub fn from_result(result: Result<R, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::failure(error),
        }
    }

    // ── Boundary capture ────────────────────────────────────────────────
    //
    // The sole sanctioned boundary between raw, panicking code and the
    // Outcome world. Collaborators performing I/O wrap the raw call here,
    // supplying an error mapper for the failure conditions they recognize.

    /// Runs `thunk`; a panic becomes a defect.
    #[must_use]
    pub fn capture(thunk: impl FnOnce() -> R) -> Self {
        match defect::catch(thunk) {
            Ok(value) => Self::Success(value),
            Err(payload) => Self::Defect(payload),
        }
    }

    /// Runs a fallible `thunk`; a recognized error becomes a failure via
    /// `map_err`, a panic becomes a defect.
    #[must_use]
    pub fn capture_fallible<X>(
        thunk: impl FnOnce() -> Result<R, X>,
        map_err: impl FnOnce(X) -> E,
    ) -> Self {
        match defect::catch(thunk) {
            Ok(Ok(value)) => Self::Success(value),
            Ok(Err(raw)) => match defect::catch(move || map_err(raw)) {
                Ok(error) => Self::failure(error),
                Err(payload) => Self::Defect(payload),
            },
            Err(payload) => Self::Defect(payload),
        }
    }

    /// Runs a fallible `thunk` with no error mapper: errors were not
    /// recognized as expected failure conditions, so both an `Err` and a
    /// panic become defects.
    #[must_use]
    pub fn capture_strict<X: fmt::Display>(thunk: impl FnOnce() -> Result<R, X>) -> Self {
        match defect::catch(thunk) {
            Ok(Ok(value)) => Self::Success(value),
            Ok(Err(raw)) => Self::Defect(DefectPayload::from_display(raw)),
            Err(payload) => Self::Defect(payload),
        }
    }

    /// Awaits `future`; a panic while polling becomes a defect.
    pub async fn capture_future(future: impl Future<Output = R>) -> Self {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(value) => Self::Success(value),
            Err(panic) => Self::Defect(DefectPayload::from_panic(panic)),
        }
    }

    /// Awaits a fallible `future`; a recognized error becomes a failure via
    /// `map_err`, a panic while polling becomes a defect.
    pub async fn capture_future_fallible<X>(
        future: impl Future<Output = Result<R, X>>,
        map_err: impl FnOnce(X) -> E,
    ) -> Self {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Self::Success(value),
            Ok(Err(raw)) => match defect::catch(move || map_err(raw)) {
                Ok(error) => Self::failure(error),
                Err(payload) => Self::Defect(payload),
            },
            Err(panic) => Self::Defect(DefectPayload::from_panic(panic)),
        }
    }

    // ── Inspectors ──────────────────────────────────────────────────────

    /// Returns true for the success branch.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for the failure branch.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns true for the defect branch.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::Defect(_))
    }

    /// Returns the success value, if any.
    #[must_use]
    pub fn as_success(&self) -> Option<&R> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn as_failure(&self) -> Option<&Failed<E>> {
        match self {
            Self::Failure(failed) => Some(failed),
            _ => None,
        }
    }

    /// Returns the defect payload, if any.
    #[must_use]
    pub fn as_defect(&self) -> Option<&DefectPayload> {
        match self {
            Self::Defect(payload) => Some(payload),
            _ => None,
        }
    }

    /// Consumes the outcome, returning the success value if any.
    #[must_use]
    pub fn into_success(self) -> Option<R> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    // ── Combinators ─────────────────────────────────────────────────────

    /// Transforms the success value. A panic in `f` becomes a defect.
    #[must_use]
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T, E> {
        match self {
            Self::Success(value) => match defect::catch(move || f(value)) {
                Ok(mapped) => Outcome::Success(mapped),
                Err(payload) => Outcome::Defect(payload),
            },
            Self::Failure(failed) => Outcome::Failure(failed),
            Self::Defect(payload) => Outcome::Defect(payload),
        }
    }

    /// Observes the success value without changing it. A panic in `f`
    /// becomes a defect.
    #[must_use]
    pub fn inspect(self, f: impl FnOnce(&R)) -> Self {
        match self {
            Self::Success(value) => match defect::catch(|| f(&value)) {
                Ok(()) => Self::Success(value),
                Err(payload) => Self::Defect(payload),
            },
            other => other,
        }
    }

    /// Transforms the failure branch: the primary error and every
    /// suppressed error. Success and defect pass through unchanged. A panic
    /// in `f` becomes a defect.
    #[must_use]
    pub fn map_failure<F>(self, f: impl FnMut(E) -> F) -> Outcome<R, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(failed) => match defect::catch(move || failed.map(f)) {
                Ok(mapped) => Outcome::Failure(mapped),
                Err(payload) => Outcome::Defect(payload),
            },
            Self::Defect(payload) => Outcome::Defect(payload),
        }
    }

    /// Observes the primary error without changing it. A panic in `f`
    /// becomes a defect.
    #[must_use]
    pub fn inspect_failure(self, f: impl FnOnce(&E)) -> Self {
        match self {
            Self::Failure(failed) => match defect::catch(|| f(failed.error())) {
                Ok(()) => Self::Failure(failed),
                Err(payload) => Self::Defect(payload),
            },
            other => other,
        }
    }

    /// The chain operator: on success, runs `f` and returns its outcome
    /// directly (no double-wrapping). Failure and defect short-circuit
    /// without invoking `f`; a panic in `f` becomes a defect.
    ///
    /// Associative: `a.and_then(f).and_then(g)` is
    /// `a.and_then(|v| f(v).and_then(g))`.
    #[must_use]
    pub fn and_then<T>(self, f: impl FnOnce(R) -> Outcome<T, E>) -> Outcome<T, E> {
        match self {
            Self::Success(value) => match defect::catch(move || f(value)) {
                Ok(outcome) => outcome,
                Err(payload) => Outcome::Defect(payload),
            },
            Self::Failure(failed) => Outcome::Failure(failed),
            Self::Defect(payload) => Outcome::Defect(payload),
        }
    }

    /// Side-effecting validation: on success, runs `f` against the value,
    /// discards `f`'s success result, and keeps the original value. `f`'s
    /// failure or defect propagates; a panic in `f` becomes a defect.
    #[must_use]
    pub fn through<T>(self, f: impl FnOnce(&R) -> Outcome<T, E>) -> Self {
        match self {
            Self::Success(value) => {
                let checked = defect::catch(|| f(&value));
                match checked {
                    Ok(Outcome::Success(_)) => Self::Success(value),
                    Ok(Outcome::Failure(failed)) => Self::Failure(failed),
                    Ok(Outcome::Defect(payload)) | Err(payload) => Self::Defect(payload),
                }
            }
            other => other,
        }
    }

    /// Attempts to recover from a failure. `f` receives the primary error
    /// and the suppressed history; its outcome stands in for the failure.
    ///
    /// A recovery that itself fails keeps the error it was asked to recover
    /// from: the prior error joins the new failure's suppressed list,
    /// earliest first. Defects are never intercepted, and a panic in `f`
    /// becomes a defect.
    #[must_use]
    pub fn recover(self, f: impl FnOnce(&E, &[E]) -> Self) -> Self {
        match self {
            Self::Failure(failed) => {
                let attempt = defect::catch(|| f(failed.error(), failed.suppressed()));
                match attempt {
                    Ok(Self::Failure(mut next)) => {
                        let (error, mut suppressed) = failed.into_parts();
                        suppressed.push(error);
                        next.prepend_suppressed(suppressed);
                        Self::Failure(next)
                    }
                    Ok(other) => other,
                    Err(payload) => Self::Defect(payload),
                }
            }
            other => other,
        }
    }

    /// The type-changing recovery: `f` takes ownership of the primary error
    /// and the whole suppressed history and decides what, if anything, to
    /// carry forward. Defects are never intercepted; a panic in `f` becomes
    /// a defect.
    #[must_use]
    pub fn recover_with<F>(self, f: impl FnOnce(E, Vec<E>) -> Outcome<R, F>) -> Outcome<R, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(failed) => {
                let (error, suppressed) = failed.into_parts();
                match defect::catch(move || f(error, suppressed)) {
                    Ok(outcome) => outcome,
                    Err(payload) => Outcome::Defect(payload),
                }
            }
            Self::Defect(payload) => Outcome::Defect(payload),
        }
    }

    /// Runs an outcome-returning finalizer on every branch.
    ///
    /// - Both the computation and the finalizer failing combine into one
    ///   failure via [`Combine`], preserving both causes.
    /// - A failing finalizer supersedes a prior success.
    /// - An original defect survives untouched; a finalizer panic becomes a
    ///   defect only when the original was not already one.
    #[must_use]
    pub fn and_finally(self, f: impl FnOnce() -> Outcome<(), E>) -> Self
    where
        E: Combine,
    {
        match (self, defect::catch(f)) {
            (Self::Defect(payload), _) => Self::Defect(payload),
            (_, Err(payload)) | (_, Ok(Outcome::Defect(payload))) => Self::Defect(payload),
            (original, Ok(Outcome::Success(()))) => original,
            (Self::Success(_), Ok(Outcome::Failure(finalization))) => Self::Failure(finalization),
            (Self::Failure(program), Ok(Outcome::Failure(finalization))) => {
                let (program_error, mut suppressed) = program.into_parts();
                let (finalization_error, finalization_suppressed) = finalization.into_parts();
                suppressed.extend(finalization_suppressed);
                Self::Failure(Failed::with_suppressed(
                    E::combine(program_error, finalization_error),
                    suppressed,
                ))
            }
        }
    }

    // ── Terminal observers ──────────────────────────────────────────────

    /// The three-way terminal observer. Every top-level consumer ends its
    /// chain here; a two-way success/failure split would treat defects, the
    /// signal of a bug, as ordinary failures.
    pub fn fold<T>(
        self,
        on_success: impl FnOnce(R) -> T,
        on_failure: impl FnOnce(Failed<E>) -> T,
        on_defect: impl FnOnce(DefectPayload) -> T,
    ) -> T {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(failed) => on_failure(failed),
            Self::Defect(payload) => on_defect(payload),
        }
    }

    /// Collapses into a `Result` for `?`-interop at crate edges. The
    /// failure/defect distinction is preserved inside [`OutcomeError`].
    pub fn into_result(self) -> Result<R, OutcomeError<E>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failed) => Err(OutcomeError::Failure(failed)),
            Self::Defect(payload) => Err(OutcomeError::Defect(payload)),
        }
    }
}

impl<R, E> From<Result<R, E>> for Outcome<R, E> {
    fn from(result: Result<R, E>) -> Self {
        Self::from_result(result)
    }
}

/// Non-success outcome carried through a `Result` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError<E> {
    /// An expected, typed failure.
    Failure(Failed<E>),
    /// An unexpected defect.
    Defect(DefectPayload),
}

impl<E: fmt::Display> fmt::Display for OutcomeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(failed) => write!(f, "{failed}"),
            Self::Defect(payload) => write!(f, "{payload}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for OutcomeError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{COMBINED_ERROR_TAG, TagError};

    type Out = Outcome<i64, TagError>;

    fn failure(tag: &'static str) -> Out {
        Outcome::failure(TagError::new(tag, "test"))
    }

    #[test]
    fn map_transforms_success_only() {
        assert_eq!(Out::success(2).map(|v| v + 1), Outcome::success(3));
        assert_eq!(failure("E").map(|v| v + 1), failure("E"));
    }

    #[test]
    fn map_panic_is_defect_not_failure() {
        let out = Out::success(2).map(|_| -> i64 { panic!("mapper bug") });
        assert_eq!(out.as_defect().map(DefectPayload::message), Some("mapper bug"));
    }

    #[test]
    fn inspect_keeps_value_and_observes() {
        let mut seen = 0;
        let out = Out::success(5).inspect(|v| seen = *v);
        assert_eq!(out, Outcome::success(5));
        assert_eq!(seen, 5);
    }

    #[test]
    fn inspect_panic_is_defect() {
        let out = Out::success(5).inspect(|_| panic!("observer bug"));
        assert!(out.is_defect());
    }

    #[test]
    fn map_failure_maps_error_and_suppressed() {
        let failed = Failed::with_suppressed(
            TagError::new("A", "first"),
            vec![TagError::new("B", "second")],
        );
        let out: Outcome<i64, String> =
            Outcome::Failure(failed).map_failure(|e| e.tag().to_string());
        let mapped = out.as_failure().expect("failure");
        assert_eq!(mapped.error(), "A");
        assert_eq!(mapped.suppressed(), ["B".to_string()]);
    }

    #[test]
    fn inspect_failure_skips_success_and_defect() {
        let mut called = false;
        let out = Out::success(1).inspect_failure(|_| called = true);
        assert_eq!(out, Outcome::success(1));
        assert!(!called);

        let defect = Out::defect(DefectPayload::msg("bug")).inspect_failure(|_| called = true);
        assert!(defect.is_defect());
        assert!(!called);
    }

    #[test]
    fn and_then_short_circuits_without_calling_f() {
        let mut called = false;
        let out = failure("E").and_then(|v| {
            called = true;
            Outcome::success(v)
        });
        assert_eq!(out, failure("E"));
        assert!(!called);
    }

    #[test]
    fn and_then_panic_is_defect() {
        let out = Out::success(1).and_then(|_| -> Out { panic!("chain bug") });
        assert!(out.is_defect());
    }

    #[test]
    fn through_keeps_original_value_on_success() {
        let out = Out::success(7).through(|v| Outcome::success(v.to_string()));
        assert_eq!(out, Outcome::success(7));
    }

    #[test]
    fn through_propagates_validation_failure() {
        let out = Out::success(7).through(|_| Outcome::<(), _>::failure(TagError::new("V", "no")));
        assert_eq!(out.as_failure().map(|f| f.error().tag()), Some("V"));
    }

    #[test]
    fn through_panic_is_defect() {
        let out = Out::success(7).through(|_| -> Outcome<(), TagError> { panic!("validator bug") });
        assert!(out.is_defect());
    }

    #[test]
    fn recover_turns_failure_into_success() {
        let out = failure("E").recover(|_, _| Outcome::success(0));
        assert_eq!(out, Outcome::success(0));
    }

    #[test]
    fn recover_never_intercepts_defect() {
        let payload = DefectPayload::msg("bug");
        let out = Out::defect(payload.clone()).recover(|_, _| Outcome::success(0));
        assert_eq!(out, Outcome::defect(payload));
    }

    #[test]
    fn recover_panic_is_defect() {
        let out = failure("E").recover(|_, _| panic!("recovery bug"));
        assert!(out.is_defect());
    }

    #[test]
    fn failed_recovery_accumulates_suppressed_earliest_first() {
        let out = failure("First")
            .recover(|_, _| failure("Second"))
            .recover(|error, suppressed| {
                assert_eq!(error.tag(), "Second");
                assert_eq!(suppressed.len(), 1);
                assert_eq!(suppressed[0].tag(), "First");
                failure("Third")
            });
        let failed = out.as_failure().expect("failure");
        assert_eq!(failed.error().tag(), "Third");
        let tags: Vec<_> = failed.suppressed().iter().map(TagError::tag).collect();
        assert_eq!(tags, ["First", "Second"]);
    }

    #[test]
    fn recover_with_changes_error_type_and_hands_over_history() {
        let out: Outcome<i64, String> = failure("First")
            .recover(|_, _| failure("Second"))
            .recover_with(|error, suppressed| {
                assert_eq!(suppressed.len(), 1);
                Outcome::failure(format!("{}+{}", suppressed[0].tag(), error.tag()))
            });
        let failed = out.as_failure().expect("failure");
        assert_eq!(failed.error(), "First+Second");
        assert!(failed.suppressed().is_empty());
    }

    #[test]
    fn and_finally_success_with_clean_finalizer() {
        let out = Out::success(3).and_finally(|| Outcome::success(()));
        assert_eq!(out, Outcome::success(3));
    }

    #[test]
    fn and_finally_failing_finalizer_supersedes_success() {
        let out = Out::success(3).and_finally(|| Outcome::failure(TagError::new("Fin", "close")));
        assert_eq!(out.as_failure().map(|f| f.error().tag()), Some("Fin"));
    }

    #[test]
    fn and_finally_combines_both_failures() {
        let out = failure("Prog").and_finally(|| Outcome::failure(TagError::new("Fin", "close")));
        let failed = out.as_failure().expect("failure");
        assert_eq!(failed.error().tag(), COMBINED_ERROR_TAG);
        let cause_tags: Vec<_> = failed.error().causes().iter().map(TagError::tag).collect();
        assert_eq!(cause_tags, ["Prog", "Fin"]);
    }

    #[test]
    fn and_finally_defect_survives_failing_finalizer() {
        let payload = DefectPayload::msg("bug");
        let out = Out::defect(payload.clone())
            .and_finally(|| Outcome::failure(TagError::new("Fin", "close")));
        assert_eq!(out, Outcome::defect(payload));
    }

    #[test]
    fn and_finally_finalizer_panic_is_defect() {
        let out = Out::success(3).and_finally(|| panic!("finalizer bug"));
        assert!(out.is_defect());
    }

    #[test]
    fn capture_converts_panic_only() {
        assert_eq!(Out::capture(|| 4), Outcome::success(4));
        assert!(Out::capture(|| panic!("boom")).is_defect());
    }

    #[test]
    fn capture_fallible_maps_recognized_errors() {
        let out = Out::capture_fallible(
            || "nope".parse::<i64>(),
            |e| TagError::new("ValidationError", e.to_string()),
        );
        assert_eq!(out.as_failure().map(|f| f.error().tag()), Some("ValidationError"));
    }

    #[test]
    fn capture_strict_defects_on_unmapped_error() {
        let out = Out::capture_strict(|| "nope".parse::<i64>());
        assert!(out.is_defect());
    }

    #[test]
    fn capture_future_resolves_and_captures_panics() {
        let ok = futures_lite::future::block_on(Out::capture_future(async { 9 }));
        assert_eq!(ok, Outcome::success(9));

        let bad = futures_lite::future::block_on(Out::capture_future(async {
            panic!("async bug")
        }));
        assert!(bad.is_defect());
    }

    #[test]
    fn capture_future_fallible_maps_errors() {
        let out = futures_lite::future::block_on(Out::capture_future_fallible(
            async { "12x".parse::<i64>() },
            |e| TagError::new("ValidationError", e.to_string()),
        ));
        assert!(out.is_failure());
    }

    #[test]
    fn fold_routes_each_branch() {
        let tally = |o: Out| o.fold(|_| "ok", |_| "fail", |_| "defect");
        assert_eq!(tally(Outcome::success(1)), "ok");
        assert_eq!(tally(failure("E")), "fail");
        assert_eq!(tally(Outcome::defect(DefectPayload::msg("d"))), "defect");
    }

    #[test]
    fn into_result_preserves_the_distinction() {
        assert!(matches!(Out::success(1).into_result(), Ok(1)));
        assert!(matches!(
            failure("E").into_result(),
            Err(OutcomeError::Failure(_))
        ));
        assert!(matches!(
            Out::defect(DefectPayload::msg("d")).into_result(),
            Err(OutcomeError::Defect(_))
        ));
    }
}
