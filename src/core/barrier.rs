//! # Phase barrier: fan-out one phase, join every invocation.
//!
//! ```text
//! Barrier::spawn(apps, phase, invoke)
//!   ├─► publish PhaseStarting
//!   ├─► app[0] ──► set.spawn(invoke(app[0]))   ──┐
//!   ├─► app[1] ──► set.spawn(invoke(app[1]))   ──┤  one task per application
//!   └─► app[N] ──► set.spawn(invoke(app[N]))   ──┘
//!
//! PhaseSet::join()
//!   └─► join_next() until empty ──► publish PhaseCompleted
//! ```
//!
//! ## Rules
//! - No lock is held across the fan-out; the join is a pure counting barrier.
//! - An invocation that never returns blocks `join()` forever.
//! - Each invocation publishes `AppPhaseStarting` and then `AppPhaseFinished` or `AppPanicked`.
//! - A panic is caught inside the invocation task; when an escalation scope is
//!   given, the panic cancels it.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;

use crate::apps::AppRef;
use crate::core::{InFlight, Phase};
use crate::events::{Bus, Event, EventKind};
use crate::scope::AppContext;

/// Spawns phase invocations and tracks them while they run.
#[derive(Clone)]
pub(crate) struct Barrier {
    bus: Bus,
    inflight: Arc<InFlight>,
}

/// Outcome of one joined phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhaseReport {
    pub(crate) invoked: usize,
    pub(crate) panicked: usize,
}

/// Invocations of one phase that have been spawned but not yet joined.
///
/// Dropping a `PhaseSet` aborts its invocations; always [`join`](Self::join) it.
pub(crate) struct PhaseSet {
    phase: Phase,
    invoked: usize,
    set: JoinSet<bool>,
    bus: Bus,
}

impl Barrier {
    pub(crate) fn new(bus: Bus, inflight: Arc<InFlight>) -> Self {
        Self { bus, inflight }
    }

    /// Runs `phase` on every application and waits until all invocations return.
    pub(crate) async fn run<F, Fut>(
        &self,
        apps: &[AppRef],
        phase: Phase,
        escalate: Option<&AppContext>,
        invoke: F,
    ) -> PhaseReport
    where
        F: Fn(AppRef) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn(apps, phase, escalate, invoke).join().await
    }

    /// Starts `phase` on every application without waiting.
    pub(crate) fn spawn<F, Fut>(
        &self,
        apps: &[AppRef],
        phase: Phase,
        escalate: Option<&AppContext>,
        invoke: F,
    ) -> PhaseSet
    where
        F: Fn(AppRef) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.bus
            .publish(Event::new(EventKind::PhaseStarting).with_phase(phase));

        let mut set = JoinSet::new();
        for app in apps {
            let name: Arc<str> = Arc::from(app.name());
            let guard = self.inflight.enter(&name, phase);
            let fut = invoke(Arc::clone(app));
            let bus = self.bus.clone();
            let escalate = escalate.cloned();

            set.spawn(async move {
                let _guard = guard;
                bus.publish(
                    Event::new(EventKind::AppPhaseStarting)
                        .with_app(Arc::clone(&name))
                        .with_phase(phase),
                );

                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(()) => {
                        bus.publish(
                            Event::new(EventKind::AppPhaseFinished)
                                .with_app(name)
                                .with_phase(phase),
                        );
                        false
                    }
                    Err(panic) => {
                        let info = panic_message(panic.as_ref());
                        tracing::error!(app = %name, %phase, %info, "application panicked");
                        bus.publish(
                            Event::new(EventKind::AppPanicked)
                                .with_app(name)
                                .with_phase(phase)
                                .with_reason(info),
                        );
                        if let Some(ctx) = escalate {
                            ctx.terminate();
                        }
                        true
                    }
                }
            });
        }

        PhaseSet {
            phase,
            invoked: apps.len(),
            set,
            bus: self.bus.clone(),
        }
    }
}

impl PhaseSet {
    /// Waits for every invocation of the phase to return.
    pub(crate) async fn join(mut self) -> PhaseReport {
        let mut panicked = 0;
        while let Some(res) = self.set.join_next().await {
            match res {
                Ok(true) => panicked += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(phase = %self.phase, error = %err, "phase invocation aborted");
                }
            }
        }

        self.bus.publish(
            Event::new(EventKind::PhaseCompleted)
                .with_phase(self.phase)
                .with_reason(format!("invoked={} panicked={}", self.invoked, panicked)),
        );
        PhaseReport {
            invoked: self.invoked,
            panicked,
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
