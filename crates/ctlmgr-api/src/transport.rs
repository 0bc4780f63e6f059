// Shared transport seam and rosbridge connection settings.
//
// Typed service channels only need "send these args to that service,
// give me the values back". The `Transport` trait captures exactly that,
// so the rosbridge WebSocket client and in-memory test doubles are
// interchangeable underneath `ServiceClient`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Default rosbridge_server endpoint.
pub const DEFAULT_ROSBRIDGE_URL: &str = "ws://localhost:9090";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A request/response path into a ROS graph.
pub trait Transport: Send + Sync {
    /// Call `service` with JSON `args`, returning the response `values`.
    fn call_raw(
        &self,
        service: &str,
        args: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, Error>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn call_raw(
        &self,
        service: &str,
        args: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, Error>> + Send {
        (**self).call_raw(service, args)
    }
}

/// Connection settings for [`RosbridgeClient`](crate::RosbridgeClient).
#[derive(Debug, Clone)]
pub struct RosbridgeConfig {
    pub url: Url,
    pub timeout: Duration,
}

impl Default for RosbridgeConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_ROSBRIDGE_URL).expect("default rosbridge URL is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RosbridgeConfig {
    /// Build a config from a URL string, validating the scheme.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, Error> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "ws" | "wss" => Ok(Self { url, timeout }),
            other => Err(Error::WebSocketConnect(format!(
                "unsupported scheme '{other}' (expected ws or wss)"
            ))),
        }
    }
}
