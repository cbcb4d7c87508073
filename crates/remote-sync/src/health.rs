//! `/ping` health monitor.
//!
//! Runs as its own periodic task, independent of the status poller, so a
//! slow status request never delays a health tick or vice versa.
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use remote_proto::protocol::{ConnectionState, Endpoint};
use tracing::{debug, info, warn};

use crate::client::RemoteClient;
use crate::endpoint::EndpointProvider;
use crate::state::StateManager;
use crate::task::{IsActive, PeriodicTask};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
struct Checker {
    client: RemoteClient,
    endpoints: Arc<dyn EndpointProvider>,
    state: Arc<StateManager>,
    /// Endpoint the previous tick pinged.
    last_endpoint: Arc<Mutex<Option<Endpoint>>>,
}

impl Checker {
    async fn check_once(&self) -> Option<ConnectionState> {
        let endpoint = self.endpoints.endpoint();

        // Providers that do not announce changes still get the reset.
        {
            let mut last = lock(&self.last_endpoint);
            if last.is_some() && *last != endpoint {
                info!("health: endpoint changed, resetting to Pending");
                self.state.reset_health();
            }
            *last = endpoint.clone();
        }

        let epoch = self.state.epoch()?;

        let connection = match endpoint {
            None => {
                warn!("health: no endpoint configured");
                ConnectionState::Disconnected
            }
            Some(endpoint) => match self.client.ping(&endpoint).await {
                Ok(()) => ConnectionState::Connected,
                Err(e) => {
                    warn!("health: {}", e);
                    ConnectionState::Disconnected
                }
            },
        };

        if self.state.apply_connection(epoch, connection) {
            Some(connection)
        } else {
            debug!("health: discarding stale ping result");
            None
        }
    }
}

struct Schedule {
    interval: Duration,
    is_active: IsActive,
}

pub struct HealthMonitor {
    checker: Checker,
    task: Mutex<PeriodicTask>,
    schedule: Mutex<Option<Schedule>>,
}

impl HealthMonitor {
    pub fn new(
        client: RemoteClient,
        endpoints: Arc<dyn EndpointProvider>,
        state: Arc<StateManager>,
    ) -> Self {
        Self {
            checker: Checker {
                client,
                endpoints,
                state,
                last_endpoint: Arc::new(Mutex::new(None)),
            },
            task: Mutex::new(PeriodicTask::new("health-monitor")),
            schedule: Mutex::new(None),
        }
    }

    /// One ping against the current endpoint.  Returns the state it applied,
    /// or `None` if no session is running or the result went stale.
    pub async fn check_once(&self) -> Option<ConnectionState> {
        self.checker.check_once().await
    }

    pub fn start(&self, interval: Duration, is_active: IsActive) {
        *lock(&self.schedule) = Some(Schedule {
            interval,
            is_active: is_active.clone(),
        });
        self.spawn(interval, is_active);
    }

    fn spawn(&self, interval: Duration, is_active: IsActive) {
        let checker = self.checker.clone();
        lock(&self.task).start(interval, is_active, move || {
            let checker = checker.clone();
            async move {
                checker.check_once().await;
            }
        });
    }

    /// The endpoint changed: drop back to `Pending` and, if the monitor was
    /// started, restart it so the new endpoint is pinged right away.
    pub fn restart(&self) {
        self.checker.state.reset_health();
        *lock(&self.checker.last_endpoint) = None;

        let schedule = lock(&self.schedule)
            .as_ref()
            .map(|s| (s.interval, s.is_active.clone()));
        if let Some((interval, is_active)) = schedule {
            info!("health: restarting monitor");
            self.spawn(interval, is_active);
        }
    }

    pub fn stop(&self) {
        lock(&self.task).stop();
        *lock(&self.schedule) = None;
        *lock(&self.checker.last_endpoint) = None;
    }

    pub fn is_running(&self) -> bool {
        lock(&self.task).is_running()
    }
}
