//! # Runtime events emitted by the driver and the lifecycle sequencer.
//!
//! The [`EventKind`] enum classifies events across four categories:
//! - **Shutdown events**: scope canceled, shutdown finished or quit deadline hit
//! - **Lifecycle events**: state transitions and phase barriers
//! - **Invocation events**: one application entering/leaving one phase
//! - **Subscriber events**: overflow and panic reports from subscriber workers
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use appvisor::{Event, EventKind, Phase};
//!
//! let ev = Event::new(EventKind::AppPanicked)
//!     .with_app("db")
//!     .with_phase(Phase::Start)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::AppPanicked);
//! assert_eq!(ev.app.as_deref(), Some("db"));
//! assert_eq!(ev.phase, Some(Phase::Start));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::{LifecycleState, Phase};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `app` (subscriber name), `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `app` (subscriber name), `reason` ("full" or "closed").
    SubscriberOverflow,

    // === Shutdown events ===
    /// Application scope canceled; the quit deadline starts now.
    ///
    /// Sets: `reason` (root canceled or application-requested), `timeout_ms` (quit budget).
    ShutdownRequested,

    /// Every Stop returned before the quit deadline.
    AllStoppedWithin,

    /// Quit deadline elapsed while invocations were still in flight.
    ///
    /// Sets: `timeout_ms` (quit budget), `reason` (pending invocations).
    QuitTimeoutExceeded,

    // === Lifecycle events ===
    /// Sequencer moved to a new state.
    ///
    /// Sets: `state`.
    StateChanged,

    /// A phase was fanned out to every application.
    ///
    /// Sets: `phase`.
    PhaseStarting,

    /// Every invocation of a phase returned.
    ///
    /// Sets: `phase`, `reason` (invocation summary).
    PhaseCompleted,

    /// Scope was canceled during Start; Run and Terminate are skipped.
    RunSkipped,

    /// Termination scope created.
    ///
    /// Sets: `timeout_ms` (terminate budget).
    TerminateDeadlineSet,

    // === Invocation events ===
    /// One application entered a phase.
    ///
    /// Sets: `app`, `phase`.
    AppPhaseStarting,

    /// One application returned from a phase.
    ///
    /// Sets: `app`, `phase`.
    AppPhaseFinished,

    /// One application panicked inside a phase.
    ///
    /// Sets: `app`, `phase`, `reason` (panic message).
    AppPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Application (or subscriber) name, if applicable.
    pub app: Option<Arc<str>>,
    /// Phase the event refers to.
    pub phase: Option<Phase>,
    /// New lifecycle state (for `StateChanged`).
    pub state: Option<LifecycleState>,
    /// Human-readable reason (panic message, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Deadline budget in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            app: None,
            phase: None,
            state: None,
            reason: None,
            timeout_ms: None,
        }
    }

    #[inline]
    pub fn with_app(mut self, app: impl Into<Arc<str>>) -> Self {
        self.app = Some(app.into());
        self
    }

    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    #[inline]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a deadline budget (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_app(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_app(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
