//! Thin HTTP client for the mpv control server.
use std::time::Duration;

use remote_proto::protocol::{Command, Endpoint, PlayerStatus, PING_REPLY};
use tracing::debug;

use crate::error::{RemoteError, Result};

/// Longest slice of an unexpected body kept in error messages.
const BODY_PREVIEW: usize = 64;

/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
}

impl RemoteClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(RemoteError::Client)?;
        Ok(Self { http })
    }

    /// `GET /mpv/status`, decoded and schema-checked.
    pub async fn fetch_status(&self, endpoint: &Endpoint) -> Result<PlayerStatus> {
        let url = endpoint.url("/mpv/status");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RemoteError::network(&url, e))?;

        let code = resp.status();
        if !code.is_success() {
            return Err(RemoteError::protocol(&url, format!("HTTP {}", code)));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| RemoteError::network(&url, e))?;
        Ok(PlayerStatus::from_json(&body)?)
    }

    /// `GET /ping`; only a 2xx with a body of exactly `pong` counts as alive.
    pub async fn ping(&self, endpoint: &Endpoint) -> Result<()> {
        let url = endpoint.url("/ping");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RemoteError::network(&url, e))?;

        let code = resp.status();
        if !code.is_success() {
            return Err(RemoteError::protocol(&url, format!("HTTP {}", code)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::network(&url, e))?;

        if body == PING_REPLY {
            Ok(())
        } else {
            let preview: String = body.chars().take(BODY_PREVIEW).collect();
            Err(RemoteError::protocol(&url, format!("ping answered {:?}", preview)))
        }
    }

    /// Fire one control request.  Any HTTP response counts as delivered; the
    /// body is ignored.
    pub async fn send_command(&self, endpoint: &Endpoint, command: &Command) -> Result<()> {
        let url = endpoint.url(&command.path());
        let resp = self
            .http
            .get(&url)
            .query(&command.query())
            .send()
            .await
            .map_err(|e| RemoteError::network(&url, e))?;
        debug!("command {} -> HTTP {}", command.name(), resp.status());
        Ok(())
    }
}
