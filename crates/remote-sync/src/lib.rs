//! Status synchronization and command dispatch for an mpv remote.
//!
//! ```text
//!   settings ──► EndpointProvider ──┬─► StatusPoller ──► StateManager ──► watch::Receiver
//!                                   ├─► HealthMonitor ─┘      ▲
//!                                   └─► CommandDispatcher ────┘ (refresh)
//! ```
pub mod client;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod health;
pub mod poller;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod task;

pub use client::RemoteClient;
pub use dispatcher::{CommandDispatcher, Refresh};
pub use endpoint::{EndpointProvider, SettingsEndpoint};
pub use error::{RemoteError, Result};
pub use health::HealthMonitor;
pub use poller::{StatusFetcher, StatusPoller};
pub use session::Session;
pub use state::{RemoteState, StateManager};
pub use task::{always_active, ActivityFlag, IsActive, PeriodicTask};
