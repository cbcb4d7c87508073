//! Failures of a single poll, ping or command.  None of these leave the
//! component that hit them: they are logged and folded into "no data" or
//! `Disconnected`.

pub type Result<T> = std::result::Result<T, RemoteError>;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// `address` / `port` missing or unusable.
    #[error("no endpoint configured")]
    NoEndpoint,

    /// Unreachable host, refused connection, timeout.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Body is not a well-formed status payload.
    #[error("invalid status payload: {0}")]
    Validation(#[from] serde_json::Error),

    /// Server answered, but not with what the protocol expects.
    #[error("unexpected response from {url}: {detail}")]
    Protocol { url: String, detail: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RemoteError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn protocol(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Protocol {
            url: url.into(),
            detail: detail.into(),
        }
    }
}
