// ── Core error types ──
//
// Operator-facing errors from ctlmgr-core. Consumers never see WebSocket
// frames or rosbridge envelopes directly; the `From<ctlmgr_api::Error>`
// impl folds transport failures into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Service channels are not configured")]
    NotConfigured,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach rosbridge: {reason}")]
    ConnectionFailed { reason: String },

    #[error("{service} did not answer within {timeout_secs}s")]
    Timeout { service: String, timeout_secs: u64 },

    // ── Service errors ───────────────────────────────────────────────
    #[error("{service} failed: {message}")]
    Service { service: String, message: String },

    #[error("Unexpected payload: {message}")]
    Protocol { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` when rosbridge itself is gone, as opposed to a
    /// service that answered badly.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }
}

impl From<ctlmgr_api::Error> for CoreError {
    fn from(err: ctlmgr_api::Error) -> Self {
        match err {
            ctlmgr_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed { reason },
            ctlmgr_api::Error::WebSocketClosed { reason } => CoreError::ConnectionFailed {
                reason: format!("connection closed ({reason})"),
            },
            ctlmgr_api::Error::NotConnected => CoreError::ConnectionFailed {
                reason: "not connected".into(),
            },
            ctlmgr_api::Error::Timeout {
                service,
                timeout_secs,
            } => CoreError::Timeout {
                service,
                timeout_secs,
            },
            ctlmgr_api::Error::ServiceFailed { service, message } => {
                CoreError::Service { service, message }
            }
            ctlmgr_api::Error::ChannelClosed { .. } => CoreError::NotConfigured,
            ctlmgr_api::Error::Deserialization { message, .. } => CoreError::Protocol { message },
            ctlmgr_api::Error::Serialization(e) => CoreError::Protocol {
                message: e.to_string(),
            },
            ctlmgr_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid rosbridge URL: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_channel_maps_to_not_configured() {
        let err: CoreError = ctlmgr_api::Error::ChannelClosed {
            service: "/list".into(),
        }
        .into();
        assert!(matches!(err, CoreError::NotConfigured));
    }

    #[test]
    fn only_socket_failures_count_as_disconnects() {
        let closed: CoreError = ctlmgr_api::Error::WebSocketClosed {
            reason: "eof".into(),
        }
        .into();
        assert!(closed.is_connection_failure());

        let timeout: CoreError = ctlmgr_api::Error::Timeout {
            service: "/list".into(),
            timeout_secs: 30,
        }
        .into();
        assert!(!timeout.is_connection_failure());
    }

    #[test]
    fn service_failure_keeps_service_name() {
        let err: CoreError = ctlmgr_api::Error::ServiceFailed {
            service: "/campero/controller_manager/switch_controller".into(),
            message: "boom".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "/campero/controller_manager/switch_controller failed: boom"
        );
    }
}
