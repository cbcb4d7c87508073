//! A polling session: status poller, health monitor and command dispatcher
//! wired to one settings store and one state.
//!
//! `start` / `stop` are idempotent.  `stop` aborts both timers before it
//! returns and marks the session finished, so responses still in flight are
//! dropped instead of applied.
use std::sync::{Arc, Mutex, MutexGuard};

use remote_proto::config::PollingConfig;
use remote_proto::protocol::Command;
use remote_proto::settings::{is_endpoint_key, SettingsStore};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::RemoteClient;
use crate::dispatcher::{CommandDispatcher, Refresh};
use crate::endpoint::{EndpointProvider, SettingsEndpoint};
use crate::error::Result;
use crate::health::HealthMonitor;
use crate::poller::{StatusFetcher, StatusPoller};
use crate::state::{RemoteState, StateManager};
use crate::task::IsActive;

pub struct Session {
    settings: Arc<dyn SettingsStore>,
    polling: PollingConfig,
    state: Arc<StateManager>,
    poller: StatusPoller,
    health: Arc<HealthMonitor>,
    dispatcher: CommandDispatcher,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new(settings: Arc<dyn SettingsStore>, polling: PollingConfig) -> Result<Self> {
        let client = RemoteClient::new(polling.request_timeout())?;
        let endpoints: Arc<dyn EndpointProvider> =
            Arc::new(SettingsEndpoint::new(settings.clone()));
        let state = Arc::new(StateManager::new());

        let fetcher = StatusFetcher::new(client.clone(), endpoints.clone(), state.clone());
        let dispatcher =
            CommandDispatcher::new(client.clone(), endpoints.clone(), Arc::new(fetcher.clone()));
        let poller = StatusPoller::new(fetcher);
        let health = Arc::new(HealthMonitor::new(client, endpoints, state.clone()));

        Ok(Self {
            settings,
            polling,
            state,
            poller,
            health,
            dispatcher,
            watcher: Mutex::new(None),
        })
    }

    pub fn state(&self) -> Arc<StateManager> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RemoteState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn watcher(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Begin polling.  Calling it on a running session restarts both loops.
    pub fn start(&self, is_active: IsActive) {
        self.stop_timers();
        info!("session: starting");
        self.state.begin_session();

        // Subscribe before spawning so no change slips between the two.
        let changes = self.settings.subscribe();
        *self.watcher() = Some(tokio::spawn(watch_endpoint(changes, self.health.clone())));

        self.poller
            .start(self.polling.status_interval(), is_active.clone());
        self.health.start(self.polling.health_interval(), is_active);
    }

    /// Stop polling.  Nothing mutates state for this session afterwards.
    pub fn stop(&self) {
        if !self.state.is_running() {
            return;
        }
        info!("session: stopping");
        self.state.end_session();
        self.stop_timers();
    }

    fn stop_timers(&self) {
        self.poller.stop();
        self.health.stop();
        if let Some(watcher) = self.watcher().take() {
            watcher.abort();
        }
    }

    /// Dispatch a command against the endpoint current right now, then
    /// refresh status once.
    pub async fn send(&self, command: Command) {
        self.dispatcher.send(&command).await;
    }

    /// Trigger one status poll outside the schedule.
    pub fn refresh(&self) {
        self.poller.fetcher().refresh();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.state.end_session();
        self.stop_timers();
    }
}

async fn watch_endpoint(mut changes: broadcast::Receiver<String>, health: Arc<HealthMonitor>) {
    loop {
        match changes.recv().await {
            Ok(key) if is_endpoint_key(&key) => {
                info!("session: {} changed", key);
                health.restart();
            }
            Ok(key) => debug!("session: ignoring settings change to {}", key),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("session: missed {} settings changes, restarting health", n);
                health.restart();
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
