//! Bounded-concurrency, single-handler request/response channels.
//!
//! A [`Port`] wires two independently-loaded layers together without either
//! knowing the other's concrete types. Exactly one side binds a handler
//! with [`Port::accept`] during bootstrap; the other submits requests with
//! [`Port::submit`] and awaits an [`Outcome`] per request.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        PORT DISPATCH (N = 2)                       │
//! │                                                                    │
//! │  submit ──► ticket 3 ─┐                                            │
//! │  submit ──► ticket 4 ─┤ backlog (FIFO)                             │
//! │                       │                                            │
//! │            ticket 1 ──┤ in flight (≤ N)  ──► Outcome<Resp, _>      │
//! │            ticket 2 ──┘                                            │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invariants:
//!
//! - at most `N` handler invocations are in flight; slots free as tasks
//!   settle and the next ticket in submission order becomes dispatchable;
//! - the handler cell is write-once: a second `accept` fails with
//!   [`PortError::AlreadyAssigned`] and leaves the original handler active;
//! - a request dispatched before any handler is bound settles immediately
//!   as [`PortError::NotAssigned`]; the port never deadlocks on a missed
//!   bootstrap;
//! - a panic in the handler (call or poll) becomes
//!   [`PortError::HandlerPanicked`], a failure of that one request, never a
//!   crash of the dispatch path.
//!
//! Dropping a [`Submitted`] future abandons the request: a queued entry
//! leaves the backlog, a running entry releases its slot.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

use crate::config::PortConfig;
use crate::defect::{self, DefectPayload};
use crate::error::TaggedError;
use crate::outcome::Outcome;
use crate::tracing_compat::trace_event;

/// Error produced by port operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError<E> {
    /// `accept` was called on a port that already has a handler.
    AlreadyAssigned,
    /// A request was dispatched before any handler was bound.
    NotAssigned,
    /// The handler panicked while serving the request.
    HandlerPanicked(DefectPayload),
    /// The handler returned its own failure.
    Handler(E),
}

impl<E: fmt::Display> fmt::Display for PortError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAssigned => write!(f, "port handler already assigned"),
            Self::NotAssigned => write!(f, "port handler not assigned"),
            Self::HandlerPanicked(payload) => {
                write!(f, "port handler panicked: {}", payload.message())
            }
            Self::Handler(error) => write!(f, "{error}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for PortError<E> {}

impl<E: TaggedError> TaggedError for PortError<E> {
    fn tag(&self) -> &str {
        match self {
            Self::AlreadyAssigned => "PortAlreadyAssigned",
            Self::NotAssigned => "PortHandlerNotAssigned",
            Self::HandlerPanicked(_) => "PortHandlerPanicked",
            Self::Handler(error) => error.tag(),
        }
    }
}

/// Point-in-time view of a port's dispatch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMetrics {
    /// Handler invocations currently in flight.
    pub active: usize,
    /// Requests waiting for a slot.
    pub queued: usize,
    /// The fixed concurrency limit.
    pub limit: usize,
    /// Whether a handler has been bound.
    pub bound: bool,
    /// Requests submitted over the port's lifetime.
    pub total_submitted: u64,
    /// Requests served to completion (any branch).
    pub total_served: u64,
}

type HandlerFuture<Resp, E> = Pin<Box<dyn Future<Output = Outcome<Resp, E>> + Send>>;
type Handler<Req, Resp, E> = Arc<dyn Fn(Req) -> HandlerFuture<Resp, E> + Send + Sync>;

/// A waiting submission. The waker is absent until the future's first poll.
struct Waiter {
    ticket: u64,
    waker: Option<Waker>,
}

struct PortState<Req, Resp, E> {
    handler: Option<Handler<Req, Resp, E>>,
    backlog: VecDeque<Waiter>,
    active: usize,
    next_ticket: u64,
}

impl<Req, Resp, E> PortState<Req, Resp, E> {
    /// Wakes the frontmost waiter that has registered a waker.
    fn wake_front(&mut self) {
        if let Some(waiter) = self.backlog.front_mut()
            && let Some(waker) = waiter.waker.take()
        {
            waker.wake();
        }
    }
}

struct PortInner<Req, Resp, E> {
    state: Mutex<PortState<Req, Resp, E>>,
    limit: usize,
    submitted: AtomicU64,
    served: AtomicU64,
}

impl<Req, Resp, E> PortInner<Req, Resp, E> {
    /// Releases one concurrency slot and lets the next ticket run.
    fn release_slot(&self) {
        let mut state = self.state.lock();
        state.active -= 1;
        state.wake_front();
    }
}

/// Bounded-concurrency, single-handler request/response channel.
///
/// Cloning yields another handle to the same channel; the two sides of a
/// wiring each hold one.
pub struct Port<Req, Resp, E> {
    inner: Arc<PortInner<Req, Resp, E>>,
}

impl<Req, Resp, E> Clone for Port<Req, Resp, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Req, Resp, E> fmt::Debug for Port<Req, Resp, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Port")
            .field("limit", &self.inner.limit)
            .field("bound", &state.handler.is_some())
            .field("active", &state.active)
            .field("queued", &state.backlog.len())
            .finish()
    }
}

impl<Req, Resp, E> Port<Req, Resp, E> {
    /// Creates a port with the given concurrency limit.
    ///
    /// # Panics
    ///
    /// Panics when `limit` is zero; a port that can never dispatch is a
    /// wiring bug, not a runtime condition.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        assert!(limit >= 1, "port concurrency limit must be at least 1");
        Self {
            inner: Arc::new(PortInner {
                state: Mutex::new(PortState {
                    handler: None,
                    backlog: VecDeque::new(),
                    active: 0,
                    next_ticket: 0,
                }),
                limit,
                submitted: AtomicU64::new(0),
                served: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a port from a validated configuration.
    #[must_use]
    pub fn with_config(config: &PortConfig) -> Self {
        Self::new(config.concurrency)
    }

    /// Returns the fixed concurrency limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.inner.limit
    }

    /// Returns true once a handler has been bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.inner.state.lock().handler.is_some()
    }

    /// Returns a point-in-time view of the dispatch state.
    #[must_use]
    pub fn metrics(&self) -> PortMetrics {
        let state = self.inner.state.lock();
        PortMetrics {
            active: state.active,
            queued: state.backlog.len(),
            limit: self.inner.limit,
            bound: state.handler.is_some(),
            total_submitted: self.inner.submitted.load(Ordering::Relaxed),
            total_served: self.inner.served.load(Ordering::Relaxed),
        }
    }

    /// Binds the handler, exactly once.
    ///
    /// A second call fails with [`PortError::AlreadyAssigned`] and does not
    /// replace the existing handler. Binding is expected during bootstrap,
    /// strictly before traffic starts.
    pub fn accept<F, Fut>(&self, handler: F) -> Outcome<(), PortError<E>>
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome<Resp, E>> + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.handler.is_some() {
            return Outcome::failure(PortError::AlreadyAssigned);
        }
        state.handler = Some(Arc::new(move |request| {
            Box::pin(handler(request)) as HandlerFuture<Resp, E>
        }));
        trace_event!("port handler bound");
        // late bootstrap: requests may already be queued
        state.wake_front();
        Outcome::success(())
    }

    /// Binds a synchronous handler, exactly once.
    pub fn accept_fn<F>(&self, handler: F) -> Outcome<(), PortError<E>>
    where
        F: Fn(Req) -> Outcome<Resp, E> + Send + Sync + 'static,
        Resp: Send + 'static,
        E: Send + 'static,
    {
        self.accept(move |request| std::future::ready(handler(request)))
    }

    /// Enqueues a request, returning a future of the response.
    ///
    /// Requests dispatch in submission order as slots free up. The returned
    /// future is lazy; dropping it abandons the request.
    pub fn submit(&self, request: Req) -> Submitted<Req, Resp, E> {
        let ticket = {
            let mut state = self.inner.state.lock();
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.backlog.push_back(Waiter {
                ticket,
                waker: None,
            });
            ticket
        };
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        trace_event!(ticket, "port request submitted");
        Submitted {
            inner: Arc::clone(&self.inner),
            ticket,
            stage: Stage::Queued(Some(request)),
        }
    }
}

enum Stage<Req, Resp, E> {
    /// Waiting for a free slot; the request rides along until dispatch.
    Queued(Option<Req>),
    /// The handler future is in flight and holds a slot.
    Running(HandlerFuture<Resp, E>),
    Done,
}

/// Future returned by [`Port::submit`], resolving to the response outcome.
#[must_use = "a submitted request does nothing until polled"]
pub struct Submitted<Req, Resp, E> {
    inner: Arc<PortInner<Req, Resp, E>>,
    ticket: u64,
    stage: Stage<Req, Resp, E>,
}

// Plain data plus an already-boxed handler future; nothing is pinned
// through Req itself.
impl<Req, Resp, E> Unpin for Submitted<Req, Resp, E> {}

impl<Req, Resp, E> Future for Submitted<Req, Resp, E> {
    type Output = Outcome<Resp, PortError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            match &mut this.stage {
                Stage::Queued(request) => {
                    let mut state = this.inner.state.lock();
                    let is_front = state.backlog.front().is_some_and(|w| w.ticket == this.ticket);
                    if !(is_front && state.active < this.inner.limit) {
                        if let Some(waiter) =
                            state.backlog.iter_mut().find(|w| w.ticket == this.ticket)
                        {
                            waiter.waker = Some(cx.waker().clone());
                        }
                        return Poll::Pending;
                    }
                    state.backlog.pop_front();
                    let Some(handler) = state.handler.clone() else {
                        state.wake_front();
                        drop(state);
                        this.stage = Stage::Done;
                        trace_event!(ticket = this.ticket, "dispatched with no handler bound");
                        return Poll::Ready(Outcome::failure(PortError::NotAssigned));
                    };
                    state.active += 1;
                    // remaining slots, if any, belong to the next ticket
                    state.wake_front();
                    drop(state);
                    let request = request.take().expect("request already dispatched");
                    trace_event!(ticket = this.ticket, "dispatching request");
                    match defect::catch(move || handler(request)) {
                        Ok(future) => this.stage = Stage::Running(future),
                        Err(payload) => {
                            this.inner.release_slot();
                            this.settle();
                            return Poll::Ready(Outcome::failure(PortError::HandlerPanicked(
                                payload,
                            )));
                        }
                    }
                }
                Stage::Running(future) => {
                    return match defect::catch(|| future.as_mut().poll(cx)) {
                        Ok(Poll::Pending) => Poll::Pending,
                        Ok(Poll::Ready(outcome)) => {
                            this.inner.release_slot();
                            this.settle();
                            Poll::Ready(outcome.map_failure(PortError::Handler))
                        }
                        Err(payload) => {
                            this.inner.release_slot();
                            this.settle();
                            Poll::Ready(Outcome::failure(PortError::HandlerPanicked(payload)))
                        }
                    };
                }
                Stage::Done => panic!("Submitted polled after completion"),
            }
        }
    }
}

impl<Req, Resp, E> Submitted<Req, Resp, E> {
    /// Marks the request settled and counts it as served.
    fn settle(&mut self) {
        self.stage = Stage::Done;
        self.inner.served.fetch_add(1, Ordering::Relaxed);
    }
}

impl<Req, Resp, E> Drop for Submitted<Req, Resp, E> {
    fn drop(&mut self) {
        match self.stage {
            Stage::Queued(_) => {
                let mut state = self.inner.state.lock();
                let was_front = state.backlog.front().is_some_and(|w| w.ticket == self.ticket);
                state.backlog.retain(|w| w.ticket != self.ticket);
                if was_front {
                    state.wake_front();
                }
            }
            Stage::Running(_) => self.inner.release_slot(),
            Stage::Done => {}
        }
    }
}
