//! # Lifecycle sequencer.
//!
//! Drives one group of applications through the four phases:
//!
//! ```text
//! Created
//!   └─► Start on every app (barrier) ──► Started
//!         ├─ scope canceled? ──► SkippedRun ─────────────────────────────────────┐
//!         └─ scope alive     ──► Running                                         │
//!               ├─► spawn Run on every app (not joined yet)                      │
//!               ├─► wait: application scope canceled                             │
//!               └─► Terminating                                                  │
//!                     ├─► TerminateContext::with_timeout(terminate_timeout)      │
//!                     ├─► Terminate on every app (barrier)                       │
//!                     └─► join Run invocations                                   │
//!                                                                                ▼
//!                                                 Stop on every app (barrier) ──► Stopped
//! ```
//!
//! ## Rules
//! - Start is never interrupted; the branch is decided after every Start returned.
//! - Run and Terminate are skipped together: Terminate requires a Run.
//! - Stop runs on every path, exactly once per application.
//! - A panic in Start or Run cancels the application scope; a panic in
//!   Terminate or Stop is only reported.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::apps::AppRef;
use crate::core::barrier::Barrier;
use crate::core::LifecycleState;
use crate::core::Phase;
use crate::events::{Bus, Event, EventKind};
use crate::scope::{AppContext, TerminateContext};

/// Background state machine for one `run_all` call.
pub(crate) struct Lifecycle {
    apps: Vec<AppRef>,
    ctx: AppContext,
    terminate_timeout: Duration,
    barrier: Barrier,
    bus: Bus,
    state: LifecycleState,
    /// Filled once Terminating begins; read by the driver on quit timeout.
    terminate_ctx: Arc<OnceLock<TerminateContext>>,
}

impl Lifecycle {
    pub(crate) fn new(
        apps: Vec<AppRef>,
        ctx: AppContext,
        terminate_timeout: Duration,
        barrier: Barrier,
        bus: Bus,
        terminate_ctx: Arc<OnceLock<TerminateContext>>,
    ) -> Self {
        Self {
            apps,
            ctx,
            terminate_timeout,
            barrier,
            bus,
            state: LifecycleState::Created,
            terminate_ctx,
        }
    }

    /// Runs every phase and returns the terminal state.
    pub(crate) async fn drive(mut self) -> LifecycleState {
        self.start().await;

        if self.ctx.is_terminated() {
            self.transition(LifecycleState::SkippedRun);
            self.bus.publish(Event::new(EventKind::RunSkipped));
        } else {
            self.run_and_terminate().await;
        }

        self.barrier
            .run(&self.apps, Phase::Stop, None, |app| async move {
                app.stop().await;
            })
            .await;
        self.transition(LifecycleState::Stopped);
        self.state
    }

    async fn start(&mut self) {
        let ctx = self.ctx.clone();
        let report = self
            .barrier
            .run(&self.apps, Phase::Start, Some(&self.ctx), |app| {
                let ctx = ctx.clone();
                async move { app.start(ctx).await }
            })
            .await;
        if report.panicked > 0 {
            tracing::warn!(
                invoked = report.invoked,
                panicked = report.panicked,
                "start panicked; application scope canceled"
            );
        }
        self.transition(LifecycleState::Started);
    }

    async fn run_and_terminate(&mut self) {
        self.transition(LifecycleState::Running);

        let ctx = self.ctx.clone();
        let runs = self
            .barrier
            .spawn(&self.apps, Phase::Run, Some(&self.ctx), |app| {
                let ctx = ctx.clone();
                async move { app.run(ctx).await }
            });

        self.ctx.terminated().await;
        self.transition(LifecycleState::Terminating);

        let terminate_ctx = TerminateContext::with_timeout(self.terminate_timeout);
        let stored = self.terminate_ctx.set(terminate_ctx.clone());
        debug_assert!(stored.is_ok(), "termination scope created twice");
        self.bus.publish(
            Event::new(EventKind::TerminateDeadlineSet).with_timeout(self.terminate_timeout),
        );

        self.barrier
            .run(&self.apps, Phase::Terminate, None, |app| {
                let terminate_ctx = terminate_ctx.clone();
                async move { app.terminate(terminate_ctx).await }
            })
            .await;

        runs.join().await;
    }

    fn transition(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal lifecycle transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "lifecycle transition");
        self.state = next;
        self.bus
            .publish(Event::new(EventKind::StateChanged).with_state(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::AppFn;
    use crate::core::InFlight;
    use tokio_util::sync::CancellationToken;

    fn lifecycle(apps: Vec<AppRef>, ctx: AppContext, bus: Bus) -> Lifecycle {
        let barrier = Barrier::new(bus.clone(), Arc::new(InFlight::new()));
        Lifecycle::new(
            apps,
            ctx,
            Duration::from_millis(100),
            barrier,
            bus,
            Arc::new(OnceLock::new()),
        )
    }

    fn states(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<LifecycleState> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if let Some(state) = ev.state {
                out.push(state);
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_start_skips_run() {
        let bus = Bus::new(256);
        let mut rx = bus.subscribe();
        let ctx = AppContext::new(CancellationToken::new());
        let app: AppRef = AppFn::new("fails")
            .on_start(|ctx: AppContext| async move { ctx.terminate() })
            .arc();

        let end = lifecycle(vec![app], ctx, bus).drive().await;
        assert_eq!(end, LifecycleState::Stopped);
        assert_eq!(
            states(&mut rx),
            vec![
                LifecycleState::Started,
                LifecycleState::SkippedRun,
                LifecycleState::Stopped
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_path_creates_termination_scope() {
        let bus = Bus::new(256);
        let mut rx = bus.subscribe();
        let root = CancellationToken::new();
        let ctx = AppContext::new(root.child_token());
        let app: AppRef = AppFn::new("worker")
            .on_run(|ctx: AppContext| async move { ctx.terminated().await })
            .arc();

        let lc = lifecycle(vec![app], ctx, bus);
        let slot = Arc::clone(&lc.terminate_ctx);
        let handle = tokio::spawn(lc.drive());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(slot.get().is_none());
        root.cancel();

        assert_eq!(handle.await.unwrap(), LifecycleState::Stopped);
        assert!(slot.get().is_some());
        assert_eq!(
            states(&mut rx),
            vec![
                LifecycleState::Started,
                LifecycleState::Running,
                LifecycleState::Terminating,
                LifecycleState::Stopped
            ]
        );
    }

    async fn crash(_ctx: AppContext) {
        panic!("run crashed");
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_run_cancels_scope() {
        let bus = Bus::new(256);
        let ctx = AppContext::new(CancellationToken::new());
        let app: AppRef = AppFn::new("crashy")
            .on_run(crash)
            .arc();

        let end = lifecycle(vec![app], ctx.clone(), bus).drive().await;
        assert_eq!(end, LifecycleState::Stopped);
        assert!(ctx.is_terminated());
    }
}
