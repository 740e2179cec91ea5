//! # Event subscribers for the appvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Lifecycle ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                      │
//!                                                        ┌─────────────┼─────────────┐
//!                                                        ▼             ▼             ▼
//!                                                    LogWriter      Metrics       Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use appvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct PanicAlerts;
//!
//! #[async_trait]
//! impl Subscribe for PanicAlerts {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::AppPanicked {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "panic-alerts" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
