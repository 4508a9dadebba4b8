//! Coroutine-driven sequencing of outcomes into one outcome.
//!
//! A [`Program`] is a lazily-resumable sequence of suspension points. At
//! each point the interpreter resumes the program with the unwrapped
//! success value of the previously yielded outcome and receives the next
//! [`Step`]. Running a program to completion yields exactly one
//! [`Outcome`]:
//!
//! - yielded failures and defects short-circuit the program, interrupting
//!   it first so `interrupt`-scoped resources are released;
//! - a panic while resuming is an interpreter defect, reported through the
//!   caller-supplied defect handler;
//! - steps execute strictly sequentially, in yield order, on one logical
//!   thread of control.
//!
//! Step values cross suspension points as [`StepValue`] (type-erased,
//! `Send`). [`step_value`] boxes a value on the way out; [`resumed`]
//! recovers it on the way back in. A type confusion between the two is a
//! programming bug and surfaces as an interpreter defect, not a failure.
//!
//! # Example
//!
//! ```
//! use interlay::error::TagError;
//! use interlay::outcome::Outcome;
//! use interlay::program::{Step, Suspended, resumed, rewrap_defect, run, step_value};
//!
//! let mut stage = 0;
//! let mut total = 0_i64;
//! let program = move |input| {
//!     stage += 1;
//!     match stage {
//!         1 => Step::ready(Outcome::<_, TagError>::success(step_value(1_i64))),
//!         2 => {
//!             total += resumed::<i64>(input);
//!             Step::ready(Outcome::success(step_value(2_i64)))
//!         }
//!         _ => {
//!             total += resumed::<i64>(input);
//!             Step::Return(total)
//!         }
//!     }
//! };
//!
//! let outcome = futures_lite::future::block_on(run(program, rewrap_defect));
//! assert_eq!(outcome, Outcome::success(3));
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use futures_lite::FutureExt;

use crate::defect::{self, DefectPayload};
use crate::outcome::Outcome;
use crate::tracing_compat::trace_event;

/// Type-erased value crossing a suspension point.
pub type StepValue = Box<dyn Any + Send>;

/// Future resolving a pending suspension point.
pub type StepFuture<E> = Pin<Box<dyn Future<Output = Outcome<StepValue, E>> + Send>>;

/// An intermediate outcome at a suspension point: already resolved, or
/// still being computed by the host runtime.
pub enum Suspended<E> {
    /// The outcome is already available.
    Ready(Outcome<StepValue, E>),
    /// The outcome resolves asynchronously.
    Pending(StepFuture<E>),
}

impl<E> Suspended<E> {
    /// Wraps a future as a pending suspension point.
    pub fn pending(
        future: impl Future<Output = Outcome<StepValue, E>> + Send + 'static,
    ) -> Self {
        Self::Pending(Box::pin(future))
    }
}

impl<E> fmt::Debug for Suspended<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Suspended::Ready"),
            Self::Pending(_) => f.write_str("Suspended::Pending"),
        }
    }
}

/// One step of a program, produced by [`Program::resume`].
pub enum Step<R, E> {
    /// Suspend on an intermediate outcome; its success value is fed to the
    /// next resume.
    Suspend(Suspended<E>),
    /// The program completed with a plain value, which becomes the
    /// program's success.
    Return(R),
    /// The program completed with an explicit outcome, propagating that
    /// outcome's own branch directly.
    Conclude(Outcome<R, E>),
}

impl<R, E> Step<R, E> {
    /// Suspends on an already-resolved outcome.
    #[must_use]
    pub fn ready(outcome: Outcome<StepValue, E>) -> Self {
        Self::Suspend(Suspended::Ready(outcome))
    }

    /// Suspends on an asynchronously-resolving outcome.
    pub fn pending(
        future: impl Future<Output = Outcome<StepValue, E>> + Send + 'static,
    ) -> Self {
        Self::Suspend(Suspended::pending(future))
    }
}

/// A lazily-resumable sequence of suspension points.
///
/// Closures of type `FnMut(Option<StepValue>) -> Step<R, E>` are programs;
/// implement the trait directly when interruption has to release resources.
pub trait Program<R, E> {
    /// Produces the next step. `input` is the unwrapped success value of
    /// the previously yielded outcome, absent on the first resume.
    fn resume(&mut self, input: Option<StepValue>) -> Step<R, E>;

    /// Signals the program to stop early and release any resources held
    /// across suspension points. Called at most once, only when the
    /// interpreter short-circuits; a panic here is swallowed, because
    /// interruption runs during already-failing cleanup.
    fn interrupt(&mut self) {}
}

impl<F, R, E> Program<R, E> for F
where
    F: FnMut(Option<StepValue>) -> Step<R, E>,
{
    fn resume(&mut self, input: Option<StepValue>) -> Step<R, E> {
        self(input)
    }
}

/// Defect raised by the interpreter itself: the program panicked while
/// resuming. Distinct from defects carried by yielded outcomes, which
/// propagate untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterDefect {
    payload: DefectPayload,
}

impl InterpreterDefect {
    fn new(payload: DefectPayload) -> Self {
        Self { payload }
    }

    /// Returns the captured payload.
    #[must_use]
    pub fn payload(&self) -> &DefectPayload {
        &self.payload
    }

    /// Consumes the defect, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> DefectPayload {
        self.payload
    }
}

impl fmt::Display for InterpreterDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program interpreter defect: {}", self.payload.message())
    }
}

impl std::error::Error for InterpreterDefect {}

/// The identity defect handler: re-wraps an interpreter defect as a defect
/// outcome. Use when no conversion is wanted.
pub fn rewrap_defect<R, E>(defect: InterpreterDefect) -> Outcome<R, E> {
    Outcome::Defect(defect.into_payload())
}

/// Boxes a value for transport across a suspension point.
#[must_use]
pub fn step_value<T: Send + 'static>(value: T) -> StepValue {
    Box::new(value)
}

/// Recovers a resumed value by type.
///
/// # Panics
///
/// Panics when no value was fed or the value has a different type. Inside
/// `resume` that panic surfaces as an [`InterpreterDefect`]: feeding a
/// program the wrong type is a bug, not a failure.
#[must_use]
pub fn resumed<T: 'static>(input: Option<StepValue>) -> T {
    let value = input.unwrap_or_else(|| panic!("program resumed without a value"));
    match value.downcast::<T>() {
        Ok(boxed) => *boxed,
        Err(_) => panic!(
            "program resumed with an unexpected value type (wanted {})",
            std::any::type_name::<T>()
        ),
    }
}

/// Runs a program to completion, producing exactly one outcome.
///
/// `on_defect` decides how defects raised while resuming *this* program are
/// reported; defects carried by yielded outcomes already propagate
/// untouched and never reach it. Interruption is best-effort and never
/// escapes the interpreter.
pub async fn run<P, R, E>(
    mut program: P,
    on_defect: impl FnOnce(InterpreterDefect) -> Outcome<R, E>,
) -> Outcome<R, E>
where
    P: Program<R, E>,
{
    let mut input: Option<StepValue> = None;
    loop {
        let fed = input.take();
        let step = match defect::catch(|| program.resume(fed)) {
            Ok(step) => step,
            Err(payload) => {
                trace_event!("program resume panicked; interrupting");
                let _ = defect::catch(|| program.interrupt());
                return on_defect(InterpreterDefect::new(payload));
            }
        };
        let suspended = match step {
            Step::Return(value) => return Outcome::success(value),
            Step::Conclude(outcome) => return outcome,
            Step::Suspend(suspended) => suspended,
        };
        let outcome = match suspended {
            Suspended::Ready(outcome) => outcome,
            Suspended::Pending(future) => match AssertUnwindSafe(future).catch_unwind().await {
                Ok(outcome) => outcome,
                // a panic inside an asynchronous step is that step's own
                // defect, not an interpreter defect
                Err(panic) => Outcome::Defect(DefectPayload::from_panic(panic)),
            },
        };
        match outcome {
            Outcome::Success(value) => input = Some(value),
            Outcome::Failure(failed) => {
                trace_event!("program step failed; interrupting");
                let _ = defect::catch(|| program.interrupt());
                return Outcome::Failure(failed);
            }
            Outcome::Defect(payload) => {
                trace_event!("program step defected; interrupting");
                let _ = defect::catch(|| program.interrupt());
                return Outcome::Defect(payload);
            }
        }
    }
}
