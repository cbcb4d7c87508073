//! Timer + callback, gated by an activity predicate.
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// "Should we poll right now?", e.g. the consumer is visible.
pub type IsActive = Arc<dyn Fn() -> bool + Send + Sync>;

/// Shared on/off switch that can hand out an `IsActive`.
#[derive(Clone, Default)]
pub struct ActivityFlag(Arc<AtomicBool>);

impl ActivityFlag {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::SeqCst);
    }

    pub fn predicate(&self) -> IsActive {
        let flag = self.0.clone();
        Arc::new(move || flag.load(Ordering::SeqCst))
    }
}

pub fn always_active() -> IsActive {
    Arc::new(|| true)
}

/// One recurring loop.  At most one spawned timer exists per instance:
/// `start` aborts the previous one first, and dropping the task stops it.
pub struct PeriodicTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    /// First tick fires immediately, then every `period`.  Ticks are skipped
    /// without calling `tick` while `is_active()` is false.
    pub fn start<F, Fut>(&mut self, period: Duration, is_active: IsActive, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();
        let name = self.name;
        debug!("{}: starting, period {:?}", name, period);
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !is_active() {
                    trace!("{}: inactive, skipping tick", name);
                    continue;
                }
                tick().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("{}: stopping", self.name);
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
