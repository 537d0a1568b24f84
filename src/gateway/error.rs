use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status with the server-supplied detail.
    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}
