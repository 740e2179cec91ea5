//! # Termination scope.
//!
//! [`TerminateContext`] is handed to every [`Application::terminate`](crate::Application::terminate)
//! call. It carries a fixed deadline measured from the moment the application
//! scope was canceled, not from process start.
//!
//! ## Rules
//! - `is_expired()` turns `true` once `Instant::now() >= deadline`.
//! - The deadline does not interrupt anything: applications must poll
//!   `is_expired()` or select on `expired()` / `token().cancelled()`.
//! - The driver may expire the scope early when the quit deadline fires.

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Stand-in deadline for timeouts too large to add to the current instant (~30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline-bound context for the Terminate phase.
#[derive(Clone, Debug)]
pub struct TerminateContext {
    token: CancellationToken,
    deadline: Instant,
}

impl TerminateContext {
    /// Creates a scope that expires `timeout` from now.
    ///
    /// Spawns a timer that cancels [`token`](Self::token) at the deadline, so it
    /// must be called from within a Tokio runtime.
    pub fn with_timeout(timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let token = CancellationToken::new();

        let timer = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline) => timer.cancel(),
                _ = timer.cancelled() => {}
            }
        });

        Self { token, deadline }
    }

    /// Absolute deadline of the Terminate phase.
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the deadline has passed or the scope was expired early.
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Completes when the scope expires.
    pub async fn expired(&self) {
        tokio::select! {
            _ = time::sleep_until(self.deadline) => {}
            _ = self.token.cancelled() => {}
        }
    }

    /// Token canceled at the deadline, for passing into nested work.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Expires the scope immediately.
    pub(crate) fn expire_now(&self) {
        self.token.cancel();
    }
}
