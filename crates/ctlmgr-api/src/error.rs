use thiserror::Error;

/// Top-level error type for the `ctlmgr-api` crate.
///
/// Covers every failure mode of talking to a ROS graph through rosbridge:
/// the WebSocket itself, service-level failures reported by rosbridge, and
/// payload (de)serialization. `ctlmgr-core` maps these into its own errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// WebSocket connection or I/O failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// The server closed the WebSocket (or the stream ended) mid-call.
    #[error("WebSocket closed: {reason}")]
    WebSocketClosed { reason: String },

    /// A call was made before `connect` or after `close`.
    #[error("Not connected to rosbridge")]
    NotConnected,

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No matching `service_response` arrived in time.
    #[error("Call to {service} timed out after {timeout_secs}s")]
    Timeout { service: String, timeout_secs: u64 },

    // ── Service ─────────────────────────────────────────────────────
    /// rosbridge answered with `result: false` (service missing, handler threw, ...).
    #[error("Service {service} failed: {message}")]
    ServiceFailed { service: String, message: String },

    /// The typed channel was shut down before the call.
    #[error("Service channel {service} is shut down")]
    ChannelClosed { service: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response payload did not match the expected message type.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Request payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if reconnecting might make the same call succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::WebSocketConnect(_)
                | Self::WebSocketClosed { .. }
                | Self::NotConnected
                | Self::Timeout { .. }
        )
    }

    /// The service name this error relates to, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::Timeout { service, .. }
            | Self::ServiceFailed { service, .. }
            | Self::ChannelClosed { service } => Some(service),
            _ => None,
        }
    }
}
