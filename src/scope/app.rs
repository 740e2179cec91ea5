//! # Application scope.
//!
//! [`AppContext`] is the shared, cancelable context passed to
//! [`Application::start`](crate::Application::start) and
//! [`Application::run`](crate::Application::run).
//!
//! ## Rules
//! - Canceled when the root token is canceled or when any holder calls [`AppContext::terminate`].
//! - Cancellation is one-shot: repeated or concurrent `terminate()` calls behave like one.
//! - `is_terminated()` never races with a concurrent `terminate()`.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Shared cancelable context for the Start and Run phases.
///
/// Cloning is cheap; every clone observes and controls the same scope.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use appvisor::AppContext;
///
/// let root = CancellationToken::new();
/// let ctx = AppContext::new(root.child_token());
///
/// ctx.terminate();
/// ctx.terminate(); // no-op
/// assert!(ctx.is_terminated());
/// assert!(!root.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct AppContext {
    token: CancellationToken,
}

impl AppContext {
    /// Wraps a token as an application scope.
    ///
    /// The driver builds it from `root.child_token()`; constructing one by hand
    /// is useful for exercising an application outside the driver.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancels the scope for every application sharing it.
    ///
    /// This is how an application reports a failure or requests shutdown.
    pub fn terminate(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the scope has been canceled from any source.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the scope is canceled.
    ///
    /// Intended for `tokio::select!` inside long-running `run` bodies.
    pub fn terminated(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Derives a token that is canceled together with this scope.
    ///
    /// Canceling the returned token does not cancel the scope.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn root_cancellation_propagates() {
        let root = CancellationToken::new();
        let ctx = AppContext::new(root.child_token());
        assert!(!ctx.is_terminated());

        root.cancel();
        assert!(ctx.is_terminated());
    }

    #[test]
    fn child_token_does_not_cancel_scope() {
        let ctx = AppContext::new(CancellationToken::new());
        let child = ctx.child_token();

        child.cancel();
        assert!(!ctx.is_terminated());

        let other = ctx.child_token();
        ctx.terminate();
        assert!(other.is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_terminate_is_idempotent() {
        let ctx = AppContext::new(CancellationToken::new());
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.terminated().await })
        };

        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ctx = ctx.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                ctx.terminate();
                ctx.terminate();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        waiter.await.unwrap();
        assert!(ctx.is_terminated());
    }
}
