//! # Example: graceful
//!
//! Two applications sharing one scope, with the event log mirrored into `tracing`.
//!
//! Demonstrates how to:
//! - Assemble applications from closures with [`AppFn`].
//! - Let one application end the whole group via [`AppContext::terminate`].
//! - Drain inside the Terminate budget using [`TerminateContext`].
//! - Relay Ctrl-C / SIGTERM into the application scope.
//!
//! ## Flow
//! ```text
//! Driver::run_all()
//!     ├─► Start  (server binds, ticker primes)
//!     ├─► Run    (server waits, ticker ticks 5 times then terminates the scope)
//!     ├─► Terminate (server drains until done or the deadline)
//!     └─► Stop   (both release resources)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example graceful --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use appvisor::{
    AppContext, AppFn, AppRef, Config, Driver, LogWriter, Subscribe, TerminateContext, build_info,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Route `tracing` output to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    tracing::info!(
        pkg = build_info::name(),
        version = build_info::version(),
        build = build_info::build(),
        "starting"
    );

    // 2. Driver with the log subscriber and the signal relay
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let driver = Driver::builder(Config::with_timeouts(
        Duration::from_secs(2),
        Duration::from_secs(3),
    ))
    .with_subscribers(subs)
    .with_signal_relay(true)
    .build()?;

    // 3. A server that drains in-flight work on Terminate
    let server: AppRef = AppFn::new("server")
        .on_start(|_ctx: AppContext| async { tracing::info!("[server] listening") })
        .on_run(|ctx: AppContext| async move {
            ctx.terminated().await;
            tracing::info!("[server] shutdown requested");
        })
        .on_terminate(|ctx: TerminateContext| async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(300)) => {
                    tracing::info!("[server] drained");
                }
                _ = ctx.expired() => tracing::warn!("[server] drain cut short"),
            }
        })
        .on_stop(|| async { tracing::info!("[server] closed") })
        .arc();

    // 4. A ticker that ends the group after a few ticks
    let ticker: AppRef = AppFn::new("ticker")
        .on_run(|ctx: AppContext| async move {
            for i in 1..=5 {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(200)) => {
                        tracing::info!("[ticker] tick {i}");
                    }
                    _ = ctx.terminated() => return,
                }
            }
            ctx.terminate();
        })
        .arc();

    // 5. Run until every Stop returned (or the quit budget ran out)
    driver
        .run_all(CancellationToken::new(), vec![server, ticker])
        .await?;
    Ok(())
}
