//! # In-flight invocation tracker.
//!
//! Records which `(application, phase)` invocations have been spawned and not
//! yet returned. The driver takes a [`InFlight::snapshot`] when the quit
//! deadline fires to report what is still running.
//!
//! ```text
//! Barrier::spawn ──► enter("db", Terminate) ──► InFlightGuard
//!                                                    │ dropped when the invocation returns
//!                                                    ▼
//!                                     HashMap<"db:terminate", count>
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::Phase;

/// Thread-safe multiset of in-flight invocations.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    inner: Mutex<HashMap<String, usize>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers an invocation; it stays in flight until the guard is dropped.
    pub(crate) fn enter(self: &Arc<Self>, app: &str, phase: Phase) -> InFlightGuard {
        let key = format!("{app}:{phase}");
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_insert(0) += 1;

        InFlightGuard {
            owner: Arc::clone(self),
            key,
        }
    }

    fn leave(&self, key: &str) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(n) = map.get_mut(key) {
            *n -= 1;
            if *n == 0 {
                map.remove(key);
            }
        }
    }

    /// Sorted list of `"app:phase"` entries still running (repeated per duplicate).
    pub(crate) fn snapshot(&self) -> Vec<String> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<String> = map
            .iter()
            .flat_map(|(key, n)| std::iter::repeat_n(key.clone(), *n))
            .collect();
        out.sort_unstable();
        out
    }
}

/// Removes its invocation from the tracker on drop.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    owner: Arc<InFlight>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner.leave(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_track_duplicates_until_dropped() {
        let inflight = Arc::new(InFlight::new());
        let a = inflight.enter("web", Phase::Terminate);
        let b = inflight.enter("db", Phase::Stop);
        let c = inflight.enter("web", Phase::Terminate);

        assert_eq!(
            inflight.snapshot(),
            vec!["db:stop", "web:terminate", "web:terminate"]
        );

        drop(a);
        drop(b);
        assert_eq!(inflight.snapshot(), vec!["web:terminate"]);

        drop(c);
        assert!(inflight.snapshot().is_empty());
    }
}
