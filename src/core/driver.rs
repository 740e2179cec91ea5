//! # Driver: runs a group of applications and bounds their shutdown.
//!
//! The [`Driver`] owns the event bus, a [`SubscriberSet`] and the configuration.
//! Each [`Driver::run_all`] call derives an application scope, launches the
//! lifecycle sequencer in the background and then races it against the quit
//! deadline.
//!
//! ## High-level architecture
//! ```text
//! run_all(root, apps)
//!   ├─► app scope = root.child_token()      (canceled again on return / drop)
//!   ├─► optional signal relay ──► app scope
//!   ├─► tokio::spawn(Lifecycle::drive)      Start ─► Run ─► Terminate ─► Stop
//!   │
//!   ├─► wait: app scope canceled            (root canceled or an app called terminate())
//!   │         └─► publish ShutdownRequested
//!   │
//!   └─► timeout(quit_timeout, lifecycle):
//!          ├─ Ok   ─► publish AllStoppedWithin  ─► Ok(())
//!          └─ Err  ─► expire TerminateContext
//!                     publish QuitTimeoutExceeded ─► Err(QuitTimeoutExceeded { pending })
//!                     (lifecycle keeps running detached)
//! ```
//!
//! The quit deadline is anchored to cancellation, not to the call: when nothing
//! cancels the scope, `run_all` waits for as long as the root token lives.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use appvisor::{AppContext, AppFn, AppRef, Config, Driver};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = Driver::builder(Config::with_timeouts(
//!         Duration::from_millis(100),
//!         Duration::from_millis(500),
//!     ))
//!     .build()?;
//!
//!     let once: AppRef = AppFn::new("once")
//!         .on_run(|ctx: AppContext| async move {
//!             // do the work, then end the group
//!             ctx.terminate();
//!         })
//!         .arc();
//!
//!     driver.run_all(CancellationToken::new(), vec![once]).await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinError;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::apps::AppRef;
use crate::core::barrier::Barrier;
use crate::core::builder::DriverBuilder;
use crate::core::lifecycle::Lifecycle;
use crate::core::{Config, InFlight, LifecycleState, shutdown};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::scope::AppContext;
use crate::subscribers::SubscriberSet;

/// Coordinates application lifecycles, event delivery and bounded shutdown.
pub struct Driver {
    cfg: Config,
    bus: Bus,
    /// Stops the subscriber listener when the driver is dropped.
    listener: CancellationToken,
}

impl Driver {
    /// Creates a builder for a driver with the given configuration.
    pub fn builder(cfg: Config) -> DriverBuilder {
        DriverBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, bus: Bus, subs: SubscriberSet) -> Self {
        let driver = Self {
            cfg,
            bus,
            listener: CancellationToken::new(),
        };
        if !subs.is_empty() {
            driver.subscriber_listener(subs);
        }
        driver
    }

    /// Returns the driver configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Subscribes directly to the raw event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs a single application. See [`Driver::run_all`].
    pub async fn run(&self, root: CancellationToken, app: AppRef) -> Result<(), RuntimeError> {
        self.run_all(root, vec![app]).await
    }

    /// Runs all applications in one shared scope until they are stopped or the
    /// quit deadline elapses.
    ///
    /// Returns `Ok(())` once every Stop returned within `quit_timeout` of the
    /// application scope being canceled, and
    /// [`RuntimeError::QuitTimeoutExceeded`] otherwise. In the latter case the
    /// lifecycle is **not** aborted: Terminate/Stop may still be executing in the background.
    pub async fn run_all(
        &self,
        root: CancellationToken,
        apps: Vec<AppRef>,
    ) -> Result<(), RuntimeError> {
        let app_token = root.child_token();
        let _teardown = app_token.clone().drop_guard();
        if self.cfg.signal_relay {
            shutdown::cancel_on_signal(app_token.clone());
        }

        let inflight = Arc::new(InFlight::new());
        let terminate_ctx = Arc::new(OnceLock::new());
        let lifecycle = Lifecycle::new(
            apps,
            AppContext::new(app_token.clone()),
            self.cfg.terminate_timeout,
            Barrier::new(self.bus.clone(), Arc::clone(&inflight)),
            self.bus.clone(),
            Arc::clone(&terminate_ctx),
        );
        let mut handle = tokio::spawn(lifecycle.drive());

        tokio::select! {
            biased;
            _ = app_token.cancelled() => {}
            res = &mut handle => return self.finished(res),
        }

        let quit = self.cfg.quit_timeout;
        let reason = if root.is_cancelled() {
            "root scope canceled"
        } else {
            "application scope canceled"
        };
        tracing::info!(reason, ?quit, "shutdown requested");
        self.bus.publish(
            Event::new(EventKind::ShutdownRequested)
                .with_reason(reason)
                .with_timeout(quit),
        );

        match time::timeout(quit, &mut handle).await {
            Ok(res) => self.finished(res),
            Err(_elapsed) => {
                if let Some(ctx) = terminate_ctx.get() {
                    ctx.expire_now();
                }
                Err(self.quit_exceeded(quit, inflight.snapshot()))
            }
        }
    }

    fn finished(&self, res: Result<LifecycleState, JoinError>) -> Result<(), RuntimeError> {
        match res {
            Ok(state) => {
                tracing::debug!(%state, "lifecycle finished");
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "lifecycle task failed");
                Err(RuntimeError::LifecycleAborted {
                    reason: err.to_string(),
                })
            }
        }
    }

    fn quit_exceeded(&self, quit: Duration, pending: Vec<String>) -> RuntimeError {
        tracing::warn!(?quit, ?pending, "quit deadline exceeded; lifecycle left running");
        self.bus.publish(
            Event::new(EventKind::QuitTimeoutExceeded)
                .with_timeout(quit)
                .with_reason(pending.join(",")),
        );
        RuntimeError::QuitTimeoutExceeded { quit, pending }
    }

    /// Forwards bus events to the subscriber set until the driver is dropped.
    fn subscriber_listener(&self, subs: SubscriberSet) {
        let mut rx = self.bus.subscribe();
        let stop = self.listener.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            subs.shutdown().await;
        });
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

/// Runs one application; shorthand for [`run_all`] with a single element.
pub async fn run(
    root: CancellationToken,
    app: AppRef,
    terminate_timeout: Duration,
    quit_timeout: Duration,
) -> bool {
    run_all(root, vec![app], terminate_timeout, quit_timeout).await
}

/// Runs all applications through Start, Run, Terminate and Stop in one shared scope.
///
/// Returns `true` if every Stop returned within `quit_timeout` of the scope
/// being canceled, `false` if the quit deadline elapsed first. On `false` the
/// lifecycle keeps running detached from the caller.
///
/// `quit_timeout` should exceed `terminate_timeout`; this is not checked here
/// (use [`Driver::builder`] for a validated driver).
pub async fn run_all(
    root: CancellationToken,
    apps: Vec<AppRef>,
    terminate_timeout: Duration,
    quit_timeout: Duration,
) -> bool {
    Driver::builder(Config::with_timeouts(terminate_timeout, quit_timeout))
        .build_unchecked()
        .run_all(root, apps)
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::AppFn;
    use crate::scope::TerminateContext;
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn hanging_terminate(name: &'static str) -> AppRef {
        AppFn::new(name)
            .on_run(|ctx: AppContext| async move { ctx.terminated().await })
            .on_terminate(|_ctx| std::future::pending::<()>())
            .arc()
    }

    #[tokio::test]
    async fn builder_rejects_inverted_timeouts() {
        let res = Driver::builder(Config::with_timeouts(
            Duration::from_secs(2),
            Duration::from_secs(1),
        ))
        .build();
        assert!(matches!(res, Err(RuntimeError::InvalidTimeouts { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn quit_timeout_reports_pending_invocations() {
        let driver = Driver::builder(Config::with_timeouts(
            Duration::from_millis(100),
            Duration::from_millis(500),
        ))
        .build()
        .unwrap();
        let mut rx = driver.subscribe();

        let root = CancellationToken::new();
        let canceler = root.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            canceler.cancel();
        });

        let fine: AppRef = AppFn::new("fine").arc();
        let started = Instant::now();
        let err = driver
            .run_all(root, vec![hanging_terminate("stuck"), fine])
            .await
            .unwrap_err();

        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(510) && waited < Duration::from_millis(520));
        match err {
            RuntimeError::QuitTimeoutExceeded { quit, pending } => {
                assert_eq!(quit, Duration::from_millis(500));
                assert_eq!(pending, vec!["stuck:terminate"]);
            }
            other => panic!("unexpected: {other:?}"),
        }

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert!(kinds.contains(&EventKind::TerminateDeadlineSet));
        assert_eq!(kinds.last(), Some(&EventKind::QuitTimeoutExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn quit_timeout_expires_terminate_scope_early() {
        let captured = Arc::new(Mutex::new(None::<TerminateContext>));
        let app: AppRef = AppFn::new("stuck")
            .on_run(|ctx: AppContext| async move { ctx.terminated().await })
            .on_terminate({
                let captured = Arc::clone(&captured);
                move |ctx: TerminateContext| {
                    *captured.lock().unwrap() = Some(ctx);
                    std::future::pending::<()>()
                }
            })
            .arc();

        let root = CancellationToken::new();
        let canceler = root.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            canceler.cancel();
        });

        // quit below terminate: only the driver can expire the scope this early
        let clean = run_all(
            root,
            vec![app],
            Duration::from_secs(1),
            Duration::from_millis(100),
        )
        .await;
        assert!(!clean);

        let ctx = captured.lock().unwrap().clone().unwrap();
        assert!(Instant::now() < ctx.deadline());
        assert!(ctx.is_expired());
        assert!(ctx.token().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_lifecycle_events() {
        let recorder = Arc::new(Recorder::default());
        let sub: Arc<dyn Subscribe> = recorder.clone();
        let driver = Driver::builder(Config::with_timeouts(
            Duration::from_millis(100),
            Duration::from_millis(500),
        ))
        .with_subscribers(vec![sub])
        .build()
        .unwrap();

        let app: AppRef = AppFn::new("quitter")
            .on_start(|ctx: AppContext| async move { ctx.terminate() })
            .arc();
        driver
            .run_all(CancellationToken::new(), vec![app])
            .await
            .unwrap();

        // let the listener and the subscriber worker drain
        time::sleep(Duration::from_millis(10)).await;

        let kinds = recorder.0.lock().unwrap().clone();
        assert!(kinds.contains(&EventKind::RunSkipped));
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert_eq!(kinds.last(), Some(&EventKind::AllStoppedWithin));
        assert!(!kinds.contains(&EventKind::TerminateDeadlineSet));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_run_all_cancels_the_application_scope() {
        let driver = Driver::builder(Config::default()).build().unwrap();
        let seen = Arc::new(Mutex::new(None::<AppContext>));
        let app: AppRef = AppFn::new("watcher")
            .on_start({
                let seen = Arc::clone(&seen);
                move |ctx: AppContext| {
                    let seen = Arc::clone(&seen);
                    async move {
                        *seen.lock().unwrap() = Some(ctx);
                    }
                }
            })
            .arc();

        let run = driver.run_all(CancellationToken::new(), vec![app]);
        let _ = time::timeout(Duration::from_millis(50), run).await;

        let ctx = seen.lock().unwrap().clone().unwrap();
        assert!(ctx.is_terminated());
    }
}
