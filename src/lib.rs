//! Interlay: effect-composition runtime for wiring independently-loaded layers.
//!
//! # Overview
//!
//! Interlay is the control-flow core of a pluggable platform whose layers
//! are written and loaded independently. Fallible, possibly asynchronous
//! steps compose through a typed result algebra that strictly separates
//! three ends: success, an *expected, typed* failure, and an *unexpected*
//! defect that must never be silently treated as business failure.
//!
//! # Core Guarantees
//!
//! - **Failures are values**: expected error paths flow through
//!   [`Outcome`] combinators and are handled by branching, not by catching.
//! - **Defects surface loudly**: a panic inside any combinator callback
//!   becomes a defect, propagates past every ordinary handler, and is
//!   observable only through dedicated hooks.
//! - **Sequential by construction**: a [`Program`](program::Program) runs
//!   its suspension points strictly in yield order, interrupting the
//!   program when a step fails.
//! - **Bounded wiring**: a [`Port`](port::Port) caps in-flight handler
//!   invocations, dispatches FIFO, and never deadlocks on a missed
//!   bootstrap.
//! - **No executor lock-in**: the crate hands back plain futures; any host
//!   runtime that can poll drives them.
//!
//! # Module Structure
//!
//! - [`outcome`]: tri-state result value and combinator algebra
//! - [`defect`]: opaque payloads for unexpected errors
//! - [`error`]: tagged errors and exhaustive-with-fallback dispatch
//! - [`program`]: coroutine-driven sequencing of outcomes
//! - [`port`]: bounded-concurrency request/response channels
//! - [`config`]: port construction parameters and env layering
//! - [`laws`]: the algebraic law sheet the combinators preserve
//!
//! # Example
//!
//! ```
//! use interlay::error::TagError;
//! use interlay::outcome::Outcome;
//! use interlay::port::Port;
//!
//! let port: Port<String, usize, TagError> = Port::new(2);
//! port.accept_fn(|slug: String| {
//!     if slug.is_empty() {
//!         Outcome::failure(TagError::new("ValidationError", "empty slug"))
//!     } else {
//!         Outcome::success(slug.len())
//!     }
//! })
//! .fold(|()| (), |_| panic!("bind failed"), |_| panic!("bind defected"));
//!
//! let outcome = futures_lite::future::block_on(port.submit("front-page".into()));
//! assert_eq!(outcome, Outcome::success(10));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod defect;
pub mod error;
pub mod laws;
pub mod outcome;
pub mod port;
pub mod program;

mod tracing_compat;

// Re-exports for convenient access to core types
pub use config::{ConfigError, DEFAULT_PORT_CONCURRENCY, PORT_CONCURRENCY_ENV, PortConfig};
pub use defect::DefectPayload;
pub use error::{COMBINED_ERROR_TAG, Combine, Dispatch, TagError, TaggedError, dispatch};
pub use outcome::{Failed, Outcome, OutcomeError};
pub use port::{Port, PortError, PortMetrics, Submitted};
pub use program::{
    InterpreterDefect, Program, Step, StepFuture, StepValue, Suspended, resumed, rewrap_defect,
    run, step_value,
};
