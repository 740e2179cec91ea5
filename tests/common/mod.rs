#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use appvisor::{AppContext, AppRef, Application, Phase, TerminateContext};
use async_trait::async_trait;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// One recorded phase boundary.
#[derive(Clone, Debug)]
pub struct Entry {
    pub app: &'static str,
    pub phase: Phase,
    pub done: bool,
    pub at: Instant,
}

/// Shared, ordered record of every phase entry and exit.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Entry>>>);

impl Journal {
    fn push(&self, app: &'static str, phase: Phase, done: bool) {
        self.0.lock().unwrap().push(Entry {
            app,
            phase,
            done,
            at: Instant::now(),
        });
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.lock().unwrap().clone()
    }

    /// Number of times `app` entered `phase`.
    pub fn invoked(&self, app: &str, phase: Phase) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.app == app && e.phase == phase && !e.done)
            .count()
    }

    /// Number of times `app` returned from `phase`.
    pub fn returned(&self, app: &str, phase: Phase) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.app == app && e.phase == phase && e.done)
            .count()
    }

    /// Position of the first matching entry.
    pub fn first(&self, phase: Phase, done: bool) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| e.phase == phase && e.done == done)
    }

    /// Position of the last matching entry.
    pub fn last(&self, phase: Phase, done: bool) -> Option<usize> {
        self.entries()
            .iter()
            .rposition(|e| e.phase == phase && e.done == done)
    }

    pub fn returned_at(&self, app: &str, phase: Phase) -> Option<Instant> {
        self.entries()
            .iter()
            .find(|e| e.app == app && e.phase == phase && e.done)
            .map(|e| e.at)
    }
}

/// What a probe does inside Terminate.
#[derive(Clone, Copy, Debug)]
pub enum OnTerminate {
    Return,
    Sleep(Duration),
    UntilExpired,
    Hang,
}

/// Configurable application that journals every phase.
pub struct Probe {
    name: &'static str,
    journal: Journal,
    start_for: Duration,
    cancel_in_start: bool,
    panic_in_start: bool,
    on_terminate: OnTerminate,
    stop_for: Duration,
}

impl Probe {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            start_for: Duration::ZERO,
            cancel_in_start: false,
            panic_in_start: false,
            on_terminate: OnTerminate::Return,
            stop_for: Duration::ZERO,
        }
    }

    pub fn start_for(mut self, d: Duration) -> Self {
        self.start_for = d;
        self
    }

    pub fn cancel_in_start(mut self) -> Self {
        self.cancel_in_start = true;
        self
    }

    pub fn panic_in_start(mut self) -> Self {
        self.panic_in_start = true;
        self
    }

    pub fn on_terminate(mut self, t: OnTerminate) -> Self {
        self.on_terminate = t;
        self
    }

    pub fn stop_for(mut self, d: Duration) -> Self {
        self.stop_for = d;
        self
    }

    pub fn arc(self) -> AppRef {
        Arc::new(self)
    }
}

#[async_trait]
impl Application for Probe {
    fn name(&self) -> &str {
        self.name
    }

    async fn start(&self, ctx: AppContext) {
        self.journal.push(self.name, Phase::Start, false);
        time::sleep(self.start_for).await;
        if self.panic_in_start {
            panic!("{} failed to start", self.name);
        }
        if self.cancel_in_start {
            ctx.terminate();
        }
        self.journal.push(self.name, Phase::Start, true);
    }

    async fn run(&self, ctx: AppContext) {
        self.journal.push(self.name, Phase::Run, false);
        ctx.terminated().await;
        self.journal.push(self.name, Phase::Run, true);
    }

    async fn terminate(&self, ctx: TerminateContext) {
        self.journal.push(self.name, Phase::Terminate, false);
        match self.on_terminate {
            OnTerminate::Return => {}
            OnTerminate::Sleep(d) => time::sleep(d).await,
            OnTerminate::UntilExpired => ctx.expired().await,
            OnTerminate::Hang => std::future::pending::<()>().await,
        }
        self.journal.push(self.name, Phase::Terminate, true);
    }

    async fn stop(&self) {
        self.journal.push(self.name, Phase::Stop, false);
        time::sleep(self.stop_for).await;
        self.journal.push(self.name, Phase::Stop, true);
    }
}

/// Cancels `root` after `delay`; returns the instant of cancellation.
pub fn cancel_after(root: &CancellationToken, delay: Duration) -> Instant {
    let at = Instant::now() + delay;
    let root = root.clone();
    tokio::spawn(async move {
        time::sleep_until(at).await;
        root.cancel();
    });
    at
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
