//! # appvisor
//!
//! **Appvisor** drives a group of long-running async applications through a
//! fixed four-phase lifecycle that shares one cancellation scope.
//!
//! Every application implements [`Application`] (or is assembled from closures
//! with [`AppFn`]). The driver runs each phase on all applications
//! concurrently, waits for the whole group at every phase boundary and bounds
//! how long shutdown may take once the scope is canceled.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Application  │   │ Application  │   │ Application  │
//!     │   (app #1)   │   │   (app #2)   │   │   (app #3)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Driver                                                           │
//! │  - application scope (child of the caller's root token)           │
//! │  - quit deadline guard                                            │
//! │  - Bus (broadcast events) ──► SubscriberSet (per-sub queues)      │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Lifecycle (background task)                                      │
//! │  - Barrier: fan one phase out, join every invocation              │
//! │  - InFlight: "app:phase" invocations that have not returned       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Start (all, barrier)
//!   ├─ scope canceled during Start ─► skip Run and Terminate
//!   └─ otherwise:
//!        ├─► Run (all, spawned)
//!        ├─► wait for the application scope to be canceled
//!        ├─► Terminate (all, barrier) with TerminateContext(terminate_timeout)
//!        └─► join Run
//! Stop (all, barrier)        always, exactly once per application
//! ```
//!
//! `run_all` returns `true` / `Ok(())` when Stop finished within `quit_timeout`
//! of the scope being canceled. Otherwise it returns `false` /
//! [`RuntimeError::QuitTimeoutExceeded`] and the lifecycle keeps running
//! detached.
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Applications**  | Four-phase contract, trait or closures.                       | [`Application`], [`AppFn`], [`AppRef`]  |
//! | **Scopes**        | Shared cancellation and the deadline-bound termination scope. | [`AppContext`], [`TerminateContext`]    |
//! | **Driving**       | Run a group with bounded shutdown.                            | [`run_all`], [`Driver`]                 |
//! | **Subscriber API**| Observe phases, transitions, panics and timeouts.             | [`Subscribe`], [`Event`]                |
//! | **Errors**        | Typed driver errors.                                          | [`RuntimeError`]                        |
//! | **Configuration** | Timeouts, bus capacity, signal relay.                         | [`Config`], [`DriverBuilder`]           |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that mirrors events into `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use appvisor::{AppContext, AppFn, AppRef, TerminateContext};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let server: AppRef = AppFn::new("server")
//!         .on_run(|ctx: AppContext| async move { ctx.terminated().await })
//!         .on_terminate(|ctx: TerminateContext| async move {
//!             // drain connections until the deadline at the latest
//!             let _ = ctx.remaining();
//!         })
//!         .arc();
//!
//!     let job: AppRef = AppFn::new("job")
//!         .on_run(|ctx: AppContext| async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             ctx.terminate();
//!         })
//!         .arc();
//!
//!     let clean = appvisor::run_all(
//!         CancellationToken::new(),
//!         vec![server, job],
//!         Duration::from_secs(1),
//!         Duration::from_secs(2),
//!     )
//!     .await;
//!     assert!(clean);
//! }
//! ```

mod apps;
pub mod build_info;
mod core;
mod error;
mod events;
mod scope;
mod subscribers;

// ---- Public re-exports ----

pub use apps::{AppFn, AppRef, Application};
pub use self::core::{
    Config, Driver, DriverBuilder, LifecycleState, Phase, cancel_on_signal, run, run_all,
    wait_for_shutdown_signal,
};
pub use error::RuntimeError;
pub use events::{Bus, Event, EventKind};
pub use scope::{AppContext, TerminateContext};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
