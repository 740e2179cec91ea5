//! # Four-phase application contract.
//!
//! Every component driven by [`run_all`](crate::run_all) implements [`Application`].
//! The driver invokes the phases concurrently across all applications:
//!
//! ```text
//! start(AppContext)          exactly once
//! run(AppContext)            at most once; only if the scope survived Start
//! terminate(TerminateContext) at most once; only if run() was invoked
//! stop()                     exactly once, always last
//! ```
//!
//! An application reports failure only by calling [`AppContext::terminate`];
//! the driver treats that like any other shutdown request.

use std::sync::Arc;

use async_trait::async_trait;

use crate::scope::{AppContext, TerminateContext};

/// Shared handle to an application.
pub type AppRef = Arc<dyn Application>;

/// # Long-running component with a fixed lifecycle.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use appvisor::{AppContext, Application, TerminateContext};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Application for Ticker {
///     fn name(&self) -> &str { "ticker" }
///
///     async fn start(&self, _ctx: AppContext) {}
///
///     async fn run(&self, ctx: AppContext) {
///         loop {
///             tokio::select! {
///                 _ = ctx.terminated() => return,
///                 _ = tokio::time::sleep(Duration::from_millis(250)) => {}
///             }
///         }
///     }
///
///     async fn terminate(&self, ctx: TerminateContext) {
///         // flush buffers until the deadline
///         let _ = ctx.remaining();
///     }
///
///     async fn stop(&self) {}
/// }
/// ```
#[async_trait]
pub trait Application: Send + Sync + 'static {
    /// Human-readable name used in events and in-flight reports.
    ///
    /// The default uses `type_name::<Self>()`.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Acquires resources. Call `ctx.terminate()` to signal a failed start.
    async fn start(&self, ctx: AppContext);

    /// Steady-state work; expected to return once `ctx` is terminated.
    async fn run(&self, ctx: AppContext);

    /// Graceful wind-down; should finish before `ctx` expires.
    async fn terminate(&self, ctx: TerminateContext);

    /// Releases resources.
    async fn stop(&self);
}
