//! Fire-and-forget control commands.
use std::sync::Arc;

use remote_proto::protocol::{Command, Endpoint};
use tracing::{info, warn};

use crate::client::RemoteClient;
use crate::endpoint::EndpointProvider;
use crate::error::RemoteError;

/// Something that can pull fresh status right now, out of band.
pub trait Refresh: Send + Sync {
    fn refresh(&self);
}

pub struct CommandDispatcher {
    client: RemoteClient,
    endpoints: Arc<dyn EndpointProvider>,
    refresher: Arc<dyn Refresh>,
}

impl CommandDispatcher {
    pub fn new(
        client: RemoteClient,
        endpoints: Arc<dyn EndpointProvider>,
        refresher: Arc<dyn Refresh>,
    ) -> Self {
        Self {
            client,
            endpoints,
            refresher,
        }
    }

    /// Send `command` to the endpoint current at call time.
    pub async fn send(&self, command: &Command) {
        let endpoint = self.endpoints.endpoint();
        self.send_to(endpoint.as_ref(), command).await;
    }

    /// At most one delivery attempt.  Failures are logged and swallowed, and
    /// exactly one status refresh follows whatever the outcome.
    pub async fn send_to(&self, endpoint: Option<&Endpoint>, command: &Command) {
        let result = match endpoint {
            Some(endpoint) => {
                info!("command: {} -> {}", command.name(), endpoint);
                self.client.send_command(endpoint, command).await
            }
            None => Err(RemoteError::NoEndpoint),
        };
        if let Err(e) = result {
            warn!("command: {} failed: {}", command.name(), e);
        }
        self.refresher.refresh();
    }
}
