//! `/mpv/status` polling.
//!
//! Each tick reads the endpoint fresh, fetches and validates the status, and
//! hands the outcome to the `StateManager`.  A failed tick clears the status;
//! nothing is raised to the caller.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::RemoteClient;
use crate::dispatcher::Refresh;
use crate::endpoint::EndpointProvider;
use crate::error::RemoteError;
use crate::state::StateManager;
use crate::task::{IsActive, PeriodicTask};

/// The fetch-and-apply step shared by scheduled ticks and out-of-band
/// refreshes.
#[derive(Clone)]
pub struct StatusFetcher {
    client: RemoteClient,
    endpoints: Arc<dyn EndpointProvider>,
    state: Arc<StateManager>,
}

impl StatusFetcher {
    pub fn new(
        client: RemoteClient,
        endpoints: Arc<dyn EndpointProvider>,
        state: Arc<StateManager>,
    ) -> Self {
        Self {
            client,
            endpoints,
            state,
        }
    }

    /// One poll.  Returns `true` if the outcome was applied, `false` when no
    /// session is running or the session changed while the request was in
    /// flight.
    pub async fn poll_once(&self) -> bool {
        let Some(epoch) = self.state.epoch() else {
            debug!("status: no running session, skipping poll");
            return false;
        };

        let result = match self.endpoints.endpoint() {
            Some(endpoint) => self.client.fetch_status(&endpoint).await,
            None => Err(RemoteError::NoEndpoint),
        };

        let status = match result {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("status: poll failed: {}", e);
                None
            }
        };

        let applied = self.state.apply_status(epoch, status);
        if !applied {
            debug!("status: discarding response from a finished session");
        }
        applied
    }
}

impl Refresh for StatusFetcher {
    fn refresh(&self) {
        let fetcher = self.clone();
        tokio::spawn(async move {
            fetcher.poll_once().await;
        });
    }
}

pub struct StatusPoller {
    fetcher: StatusFetcher,
    task: Mutex<PeriodicTask>,
}

impl StatusPoller {
    pub fn new(fetcher: StatusFetcher) -> Self {
        Self {
            fetcher,
            task: Mutex::new(PeriodicTask::new("status-poller")),
        }
    }

    fn task(&self) -> std::sync::MutexGuard<'_, PeriodicTask> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// (Re)start the loop.  A running loop is replaced, never duplicated.
    pub fn start(&self, interval: Duration, is_active: IsActive) {
        let fetcher = self.fetcher.clone();
        self.task().start(interval, is_active, move || {
            let fetcher = fetcher.clone();
            async move {
                fetcher.poll_once().await;
            }
        });
    }

    pub fn stop(&self) {
        self.task().stop();
    }

    pub fn is_running(&self) -> bool {
        self.task().is_running()
    }

    /// Handle for out-of-band refreshes.
    pub fn fetcher(&self) -> StatusFetcher {
        self.fetcher.clone()
    }
}
