use std::sync::Arc;

use crate::{
    core::{Config, Driver},
    error::RuntimeError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Driver`] with subscribers and signal handling.
pub struct DriverBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DriverBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (state changes, phase barriers,
    /// panics, quit timeouts) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Relays SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere) into the application scope.
    pub fn with_signal_relay(mut self, enabled: bool) -> Self {
        self.cfg.signal_relay = enabled;
        self
    }

    /// Validates the configuration and builds the driver.
    ///
    /// Spawns subscriber workers, so it must be called from within a Tokio runtime.
    pub fn build(self) -> Result<Driver, RuntimeError> {
        self.cfg.validate()?;
        Ok(self.build_unchecked())
    }

    /// Builds without checking `quit_timeout > terminate_timeout`.
    pub(crate) fn build_unchecked(self) -> Driver {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        Driver::new_internal(self.cfg, bus, subs)
    }
}
