//! rosbridge v2 WebSocket client.
//!
//! Speaks the JSON `call_service` / `service_response` exchange of
//! [rosbridge_suite](https://github.com/RobotWebTools/rosbridge_suite).
//! Calls are strictly sequential: the connection is held for the whole
//! request/response round trip, and frames for other ids are skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use ctlmgr_api::{RosbridgeClient, RosbridgeConfig};
//!
//! let client = RosbridgeClient::connect(&RosbridgeConfig::default()).await?;
//! let values = client
//!     .call_raw("/campero/controller_manager/list_controllers", serde_json::json!({}))
//!     .await?;
//! client.close().await;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::Error;
use crate::transport::{RosbridgeConfig, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// rosapi service used to read parameters from the parameter server.
const GET_PARAM_SERVICE: &str = "/rosapi/get_param";

/// A single rosbridge connection.
pub struct RosbridgeClient {
    url: Url,
    timeout: Duration,
    stream: Mutex<Option<WsStream>>,
    next_id: AtomicU64,
}

impl RosbridgeClient {
    /// Open the WebSocket to rosbridge_server.
    pub async fn connect(config: &RosbridgeConfig) -> Result<Self, Error> {
        info!(url = %config.url, "connecting to rosbridge");

        let connect = tokio_tungstenite::connect_async(config.url.as_str());
        let (stream, _response) = tokio::time::timeout(config.timeout, connect)
            .await
            .map_err(|_| Error::WebSocketConnect(format!("connect to {} timed out", config.url)))?
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        info!("rosbridge connected");
        Ok(Self {
            url: config.url.clone(),
            timeout: config.timeout,
            stream: Mutex::new(Some(stream)),
            next_id: AtomicU64::new(1),
        })
    }

    /// The rosbridge URL this client was opened against.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the socket is still held open.
    pub async fn is_connected(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Read a parameter through rosapi. `Ok(None)` means unset.
    pub async fn get_param(&self, name: &str) -> Result<Option<String>, Error> {
        let values = self
            .call_raw(GET_PARAM_SERVICE, json!({ "name": name, "default": "" }))
            .await?;
        Ok(decode_param_value(&values))
    }

    /// Send a close frame and drop the socket. Safe to call repeatedly.
    pub async fn close(&self) {
        if let Some(mut stream) = self.stream.lock().await.take() {
            if let Err(e) = stream.close(None).await {
                debug!(error = %e, "rosbridge close handshake failed (ignored)");
            }
            info!("rosbridge connection closed");
        }
    }

    fn next_call_id(&self, service: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("call_service:{service}:{n}")
    }
}

impl Transport for RosbridgeClient {
    async fn call_raw(&self, service: &str, args: Value) -> Result<Value, Error> {
        let id = self.next_call_id(service);
        let frame = json!({
            "op": "call_service",
            "id": id,
            "service": service,
            "args": args,
        });

        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or(Error::NotConnected)?;

        debug!(service, %id, "call_service");
        stream
            .send(Message::text(frame.to_string()))
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        let read = async {
            loop {
                match stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(values) = parse_service_response(&text, &id, service)? {
                            return Ok(values);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame.map_or_else(
                            || "no close frame payload".to_owned(),
                            |cf| format!("{} {}", cf.code, cf.reason),
                        );
                        return Err(Error::WebSocketClosed { reason });
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong/Binary -- tungstenite answers pings itself
                    }
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        return Err(Error::WebSocketClosed {
                            reason: "stream ended".into(),
                        });
                    }
                }
            }
        };

        let result = tokio::time::timeout(self.timeout, read)
            .await
            .map_err(|_| Error::Timeout {
                service: service.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            })?;

        if matches!(result, Err(Error::WebSocketClosed { .. })) {
            warn!(service, "rosbridge closed the connection");
            *guard = None;
        }
        result
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Incoming rosbridge frame. Only the fields we route on are modelled.
#[derive(Debug, Deserialize)]
struct IncomingFrame {
    op: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    values: Value,
    #[serde(default)]
    result: Option<bool>,
}

/// Match a text frame against the pending call.
///
/// Returns `Ok(Some(values))` for our response, `Ok(None)` for anything
/// unrelated (other ids, status messages, topic traffic) and an error for
/// a failed service call or an unparseable frame.
fn parse_service_response(text: &str, id: &str, service: &str) -> Result<Option<Value>, Error> {
    let frame: IncomingFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            debug!(error = %e, "skipping non-JSON rosbridge frame");
            return Ok(None);
        }
    };

    if frame.op != "service_response" || frame.id.as_deref() != Some(id) {
        trace!(op = %frame.op, id = ?frame.id, "skipping unrelated rosbridge frame");
        return Ok(None);
    }

    if frame.result == Some(false) {
        let message = match frame.values {
            Value::String(s) => s,
            Value::Null => "service call failed".to_owned(),
            other => other.to_string(),
        };
        return Err(Error::ServiceFailed {
            service: service.to_owned(),
            message,
        });
    }

    Ok(Some(frame.values))
}

/// rosapi returns the parameter JSON-encoded inside a string field.
fn decode_param_value(values: &Value) -> Option<String> {
    let encoded = values.get("value")?.as_str()?;
    if encoded.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Null) => None,
        Ok(Value::String(s)) => Some(s),
        Ok(other) => Some(other.to_string()),
        Err(_) => Some(encoded.to_owned()),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn matching_response_yields_values() {
        let text = json!({
            "op": "service_response",
            "id": "call_service:/list:1",
            "service": "/list",
            "values": { "controller": [] },
            "result": true
        })
        .to_string();

        let values = parse_service_response(&text, "call_service:/list:1", "/list").unwrap();
        assert_eq!(values, Some(json!({ "controller": [] })));
    }

    #[test]
    fn other_ids_and_ops_are_skipped() {
        let other_id = json!({
            "op": "service_response", "id": "call_service:/list:7", "values": {}, "result": true
        })
        .to_string();
        let status = json!({ "op": "status", "level": "info", "msg": "hello" }).to_string();

        assert_eq!(
            parse_service_response(&other_id, "call_service:/list:1", "/list").unwrap(),
            None
        );
        assert_eq!(
            parse_service_response(&status, "call_service:/list:1", "/list").unwrap(),
            None
        );
        assert_eq!(
            parse_service_response("garbage", "call_service:/list:1", "/list").unwrap(),
            None
        );
    }

    #[test]
    fn failed_result_becomes_service_failed() {
        let text = json!({
            "op": "service_response",
            "id": "x",
            "values": "Service /list does not exist",
            "result": false
        })
        .to_string();

        let err = parse_service_response(&text, "x", "/list").unwrap_err();
        match err {
            Error::ServiceFailed { service, message } => {
                assert_eq!(service, "/list");
                assert_eq!(message, "Service /list does not exist");
            }
            other => panic!("expected ServiceFailed, got {other:?}"),
        }
    }

    #[test]
    fn param_values_are_json_decoded() {
        assert_eq!(
            decode_param_value(&json!({ "value": "\"/ur5\"" })),
            Some("/ur5".to_owned())
        );
        assert_eq!(decode_param_value(&json!({ "value": "" })), None);
        assert_eq!(decode_param_value(&json!({ "value": "null" })), None);
        assert_eq!(decode_param_value(&json!({ "value": "42" })), Some("42".to_owned()));
        assert_eq!(decode_param_value(&json!({})), None);
    }
}
