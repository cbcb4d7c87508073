use std::sync::Arc;

use remote_proto::protocol::Endpoint;
use remote_proto::settings::{endpoint_from, SettingsStore};

/// Source of the current endpoint.  Asked once per tick, never cached.
pub trait EndpointProvider: Send + Sync {
    fn endpoint(&self) -> Option<Endpoint>;
}

/// A fixed endpoint.
impl EndpointProvider for Endpoint {
    fn endpoint(&self) -> Option<Endpoint> {
        Some(self.clone())
    }
}

/// Reads `address` / `port` from a settings store.
#[derive(Clone)]
pub struct SettingsEndpoint {
    store: Arc<dyn SettingsStore>,
}

impl SettingsEndpoint {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

impl EndpointProvider for SettingsEndpoint {
    fn endpoint(&self) -> Option<Endpoint> {
        endpoint_from(self.store.as_ref())
    }
}
