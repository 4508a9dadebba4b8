//! Optional tracing integration.
//!
//! When the `tracing-integration` feature is enabled, [`trace_event!`]
//! forwards to [`tracing::trace!`]; when disabled, it compiles to nothing,
//! keeping the hot paths free of logging overhead.
//!
//! Arguments use `tracing`'s field syntax and must be side-effect free:
//! with the feature disabled they are never evaluated.

#[cfg(feature = "tracing-integration")]
macro_rules! trace_event {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing-integration"))]
macro_rules! trace_event {
    ($($arg:tt)*) => {};
}

pub(crate) use trace_event;
