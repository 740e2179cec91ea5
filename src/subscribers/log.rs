//! # LogWriter: events as `tracing` records
//!
//! A subscriber that mirrors every incoming [`Event`] into `tracing`.
//! Invocation-level events go to `debug`, lifecycle events to `info`,
//! panics/overflow/quit timeouts to `warn`/`error`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO appvisor: state changed seq=3 state=running
//! INFO appvisor: shutdown requested seq=9 reason="root scope canceled" quit_ms=15000
//! INFO appvisor: terminate deadline set seq=10 terminate_ms=10000
//! WARN appvisor: quit deadline exceeded seq=31 quit_ms=15000 pending="db:terminate"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "appvisor";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let app = e.app.as_deref().unwrap_or("-");
        let phase = e.phase.map(|p| p.as_str()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::StateChanged => {
                let state = e.state.map(|s| s.as_str()).unwrap_or("-");
                tracing::info!(target: TARGET, seq = e.seq, state, "state changed");
            }
            EventKind::PhaseStarting => {
                tracing::info!(target: TARGET, seq = e.seq, phase, "phase starting");
            }
            EventKind::PhaseCompleted => {
                tracing::info!(target: TARGET, seq = e.seq, phase, reason, "phase completed");
            }
            EventKind::RunSkipped => {
                tracing::info!(target: TARGET, seq = e.seq, "run skipped: scope canceled during start");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: TARGET, seq = e.seq, reason, quit_ms = e.timeout_ms, "shutdown requested");
            }
            EventKind::TerminateDeadlineSet => {
                tracing::info!(target: TARGET, seq = e.seq, terminate_ms = e.timeout_ms, "terminate deadline set");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: TARGET, seq = e.seq, "all applications stopped");
            }
            EventKind::QuitTimeoutExceeded => {
                tracing::warn!(target: TARGET, seq = e.seq, quit_ms = e.timeout_ms, pending = reason, "quit deadline exceeded");
            }
            EventKind::AppPhaseStarting => {
                tracing::debug!(target: TARGET, seq = e.seq, app, phase, "invocation starting");
            }
            EventKind::AppPhaseFinished => {
                tracing::debug!(target: TARGET, seq = e.seq, app, phase, "invocation finished");
            }
            EventKind::AppPanicked => {
                tracing::error!(target: TARGET, seq = e.seq, app, phase, reason, "application panicked");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: TARGET, seq = e.seq, subscriber = app, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: TARGET, seq = e.seq, subscriber = app, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
