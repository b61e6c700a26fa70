//! Upstream failure types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Service answered with a non-2xx status. `message` is relayed to clients.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Request never completed (DNS, connect, TLS, timeout)
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response we could not interpret
    #[error("unexpected upstream response: {0}")]
    Decode(String),

    /// Insert with `return=representation` came back without a row
    #[error("upstream returned no rows")]
    EmptyResponse,
}

impl UpstreamError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// True when the service itself refused the request, as opposed to
    /// the relay failing to reach or understand it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
