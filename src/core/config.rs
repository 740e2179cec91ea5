//! # Driver configuration.
//!
//! Provides [`Config`], the settings shared by every `run_all` call of a [`Driver`](crate::Driver).
//!
//! ## Two timeout horizons
//! Both are measured from the moment the application scope is canceled:
//! ```text
//! cancel ──────────────┬──────────────────────┬──────────►
//!                      │ terminate_timeout    │ quit_timeout
//!                      ▼                      ▼
//!          TerminateContext expires   run_all stops waiting
//! ```
//! `quit_timeout` must exceed `terminate_timeout`, otherwise Stop may never
//! get a chance to run before the caller gives up.

use std::time::Duration;

use crate::error::RuntimeError;

/// Global configuration for the lifecycle driver.
///
/// ## Field semantics
/// - `terminate_timeout`: deadline of the [`TerminateContext`](crate::TerminateContext)
/// - `quit_timeout`: how long `run_all` waits for Stop after cancellation
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `signal_relay`: cancel the application scope on SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere)
#[derive(Clone, Debug)]
pub struct Config {
    /// Budget for the Terminate phase.
    pub terminate_timeout: Duration,

    /// Hard bound on the caller's wait once shutdown began.
    ///
    /// When exceeded, `run_all` returns while the lifecycle keeps running detached.
    pub quit_timeout: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Subscribers lagging more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Relay OS termination signals into the application scope.
    pub signal_relay: bool,
}

impl Config {
    /// Creates a config with the given timeouts and defaults for everything else.
    pub fn with_timeouts(terminate_timeout: Duration, quit_timeout: Duration) -> Self {
        Self {
            terminate_timeout,
            quit_timeout,
            ..Self::default()
        }
    }

    /// Checks the caller contract `quit_timeout > terminate_timeout`.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.quit_timeout <= self.terminate_timeout {
            return Err(RuntimeError::InvalidTimeouts {
                terminate: self.terminate_timeout,
                quit: self.quit_timeout,
            });
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `terminate_timeout = 10s`
    /// - `quit_timeout = 15s`
    /// - `bus_capacity = 1024`
    /// - `signal_relay = false`
    fn default() -> Self {
        Self {
            terminate_timeout: Duration::from_secs(10),
            quit_timeout: Duration::from_secs(15),
            bus_capacity: 1024,
            signal_relay: false,
        }
    }
}
