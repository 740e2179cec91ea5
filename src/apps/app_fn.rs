//! # Closure-backed application (`AppFn`)
//!
//! [`AppFn`] lets a caller supply any subset of the four phases as closures
//! instead of implementing [`Application`] on a named type. Phases left unset
//! are no-ops.
//!
//! Each closure is `Fn` and produces a fresh future per invocation; share state
//! explicitly through `Arc<...>` captured by the closures.
//!
//! ## Example
//! ```rust
//! use appvisor::{AppContext, AppFn, AppRef, Application};
//!
//! let app: AppRef = AppFn::new("worker")
//!     .on_run(|ctx: AppContext| async move { ctx.terminated().await })
//!     .on_stop(|| async { /* release */ })
//!     .arc();
//!
//! assert_eq!(app.name(), "worker");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::apps::app::Application;
use crate::scope::{AppContext, TerminateContext};

type ScopedHook<C> = Box<dyn Fn(C) -> BoxFuture<'static, ()> + Send + Sync>;
type StopHook = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Application assembled from optional phase closures.
pub struct AppFn {
    name: Cow<'static, str>,
    start: Option<ScopedHook<AppContext>>,
    run: Option<ScopedHook<AppContext>>,
    terminate: Option<ScopedHook<TerminateContext>>,
    stop: Option<StopHook>,
}

impl AppFn {
    /// Creates an application with every phase set to a no-op.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            start: None,
            run: None,
            terminate: None,
            stop: None,
        }
    }

    pub fn on_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.start = Some(Box::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn on_run<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.run = Some(Box::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn on_terminate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TerminateContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.terminate = Some(Box::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn on_stop<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop = Some(Box::new(move || f().boxed()));
        self
    }

    /// Wraps the application in an `Arc`, ready to coerce into an [`AppRef`](crate::AppRef).
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for AppFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppFn")
            .field("name", &self.name)
            .field("start", &self.start.is_some())
            .field("run", &self.run.is_some())
            .field("terminate", &self.terminate.is_some())
            .field("stop", &self.stop.is_some())
            .finish()
    }
}

#[async_trait]
impl Application for AppFn {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: AppContext) {
        if let Some(f) = &self.start {
            f(ctx).await;
        }
    }

    async fn run(&self, ctx: AppContext) {
        if let Some(f) = &self.run {
            f(ctx).await;
        }
    }

    async fn terminate(&self, ctx: TerminateContext) {
        if let Some(f) = &self.terminate {
            f(ctx).await;
        }
    }

    async fn stop(&self) {
        if let Some(f) = &self.stop {
            f().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn unset_phases_are_noops() {
        let app = AppFn::new("empty");
        let ctx = AppContext::new(CancellationToken::new());

        app.start(ctx.clone()).await;
        app.run(ctx.clone()).await;
        app.terminate(TerminateContext::with_timeout(Duration::from_millis(10)))
            .await;
        app.stop().await;

        assert!(!ctx.is_terminated());
        assert_eq!(app.name(), "empty");
    }

    #[tokio::test]
    async fn hooks_are_invoked_per_call() {
        let stops = Arc::new(AtomicUsize::new(0));
        let app = AppFn::new("counter")
            .on_start(|ctx: AppContext| async move { ctx.terminate() })
            .on_stop({
                let stops = Arc::clone(&stops);
                move || {
                    let stops = Arc::clone(&stops);
                    async move {
                        stops.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });

        let ctx = AppContext::new(CancellationToken::new());
        app.start(ctx.clone()).await;
        assert!(ctx.is_terminated());

        app.stop().await;
        app.stop().await;
        assert_eq!(stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn debug_lists_configured_hooks() {
        let app = AppFn::new("dbg").on_stop(|| async {});
        let out = format!("{app:?}");
        assert!(out.contains("\"dbg\""));
        assert!(out.contains("stop: true"));
        assert!(out.contains("run: false"));
    }
}
