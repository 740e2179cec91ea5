//! Error types used by the appvisor runtime.
//!
//! [`RuntimeError`] covers failures of the driver itself. Applications never
//! return errors: they report failure by terminating the shared
//! [`AppContext`](crate::AppContext), which the driver handles like any other
//! shutdown request.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the appvisor driver.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Quit deadline elapsed before every Stop returned.
    ///
    /// The lifecycle keeps running in the background; `pending` may still hold resources.
    #[error("quit timeout {quit:?} exceeded; pending: {pending:?}")]
    QuitTimeoutExceeded {
        /// The configured quit duration.
        quit: Duration,
        /// `"app:phase"` invocations that had not returned at the deadline.
        pending: Vec<String>,
    },

    /// `quit_timeout` does not exceed `terminate_timeout`.
    #[error("quit timeout {quit:?} must exceed terminate timeout {terminate:?}")]
    InvalidTimeouts {
        /// The configured terminate duration.
        terminate: Duration,
        /// The configured quit duration.
        quit: Duration,
    },

    /// The background lifecycle task ended abnormally.
    #[error("lifecycle aborted: {reason}")]
    LifecycleAborted {
        /// Join error description.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use appvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::QuitTimeoutExceeded { quit: Duration::from_secs(5), pending: vec![] };
    /// assert_eq!(err.as_label(), "runtime_quit_timeout_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::QuitTimeoutExceeded { .. } => "runtime_quit_timeout_exceeded",
            RuntimeError::InvalidTimeouts { .. } => "runtime_invalid_timeouts",
            RuntimeError::LifecycleAborted { .. } => "runtime_lifecycle_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::QuitTimeoutExceeded { quit, pending } => {
                format!("quit deadline exceeded after {quit:?}; pending={pending:?}")
            }
            RuntimeError::InvalidTimeouts { terminate, quit } => {
                format!("invalid timeouts: terminate={terminate:?} quit={quit:?}")
            }
            RuntimeError::LifecycleAborted { reason } => format!("lifecycle aborted: {reason}"),
        }
    }

    /// Indicates whether applications may still be running after this error.
    pub fn is_detached(&self) -> bool {
        matches!(
            self,
            RuntimeError::QuitTimeoutExceeded { .. } | RuntimeError::LifecycleAborted { .. }
        )
    }
}
