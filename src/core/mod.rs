//! Runtime core: phase barriers, lifecycle sequencing and bounded shutdown.
//!
//! The public surface of this module is [`Driver`] (with its [`DriverBuilder`]
//! and [`Config`]) plus the free functions [`run`] and [`run_all`].
//!
//! Internal modules:
//! - [`barrier`]: fans one phase out to every application and joins it;
//! - [`lifecycle`]: sequences Start, Run, Terminate and Stop;
//! - [`driver`]: races the lifecycle against the quit deadline;
//! - [`inflight`]: tracks invocations that have not returned yet;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod barrier;
mod builder;
mod config;
mod driver;
mod inflight;
mod lifecycle;
mod phase;
mod shutdown;

pub use builder::DriverBuilder;
pub use config::Config;
pub use driver::{Driver, run, run_all};
pub use phase::{LifecycleState, Phase};
pub use shutdown::{cancel_on_signal, wait_for_shutdown_signal};

pub(crate) use barrier::panic_message;
pub(crate) use inflight::InFlight;
