//! # Phases and lifecycle states.
//!
//! ```text
//! Created ──► Started ──┬─► Running ───► Terminating ──┬─► Stopped
//!                       └─► SkippedRun ─────────────────┘
//! ```

use std::fmt;

/// One of the four phases every [`Application`](crate::Application) implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Run,
    Terminate,
    Stop,
}

impl Phase {
    /// Short stable label (lowercase) for logs and in-flight reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Run => "run",
            Phase::Terminate => "terminate",
            Phase::Stop => "stop",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one lifecycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Nothing invoked yet.
    Created,
    /// Every Start call returned.
    Started,
    /// Run spawned on every application; waiting for the scope to be canceled.
    Running,
    /// The scope was canceled before Start finished; Run and Terminate are skipped.
    SkippedRun,
    /// Terminate in progress under the termination deadline.
    Terminating,
    /// Every Stop call returned. Terminal.
    Stopped,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Started => "started",
            LifecycleState::Running => "running",
            LifecycleState::SkippedRun => "skipped_run",
            LifecycleState::Terminating => "terminating",
            LifecycleState::Stopped => "stopped",
        }
    }

    /// Returns `true` if `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Created, Started)
                | (Started, Running)
                | (Started, SkippedRun)
                | (Running, Terminating)
                | (SkippedRun, Stopped)
                | (Terminating, Stopped)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_state_machine() {
        use LifecycleState::*;
        assert!(Created.can_transition_to(Started));
        assert!(Started.can_transition_to(SkippedRun));
        assert!(SkippedRun.can_transition_to(Stopped));

        assert!(!SkippedRun.can_transition_to(Terminating));
        assert!(!Running.can_transition_to(Stopped));
        assert!(!Stopped.can_transition_to(Created));
    }
}
