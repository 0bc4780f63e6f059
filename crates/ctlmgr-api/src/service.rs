// Typed service channels
//
// A `ServiceClient` is bound to one fully-qualified service name and one
// message type. It owns nothing but the name and a shared transport handle,
// so opening and shutting one down never touches the underlying connection.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::Error;
use crate::transport::Transport;

/// A ROS service type: its name plus request/response payloads.
pub trait Service {
    /// ROS type name, e.g. `controller_manager_msgs/ListControllers`.
    const TYPE: &'static str;
    type Request: Serialize + Sync;
    type Response: DeserializeOwned;
}

/// A typed channel to a single service endpoint.
pub struct ServiceClient<S, T> {
    name: String,
    transport: Arc<T>,
    open: bool,
    _service: PhantomData<fn() -> S>,
}

impl<S: Service, T: Transport> ServiceClient<S, T> {
    /// Bind a channel to `name` over a shared transport.
    pub fn new(name: impl Into<String>, transport: Arc<T>) -> Self {
        let name = name.into();
        debug!(service = %name, kind = S::TYPE, "service channel opened");
        Self {
            name,
            transport,
            open: true,
            _service: PhantomData,
        }
    }

    /// Fully-qualified service name this channel targets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `shutdown` has not been called yet.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Call the service and decode the typed response.
    pub async fn call(&self, request: &S::Request) -> Result<S::Response, Error> {
        if !self.open {
            return Err(Error::ChannelClosed {
                service: self.name.clone(),
            });
        }

        let args = serde_json::to_value(request)?;
        trace!(service = %self.name, %args, "calling service");
        let values = self.transport.call_raw(&self.name, args).await?;

        serde_json::from_value(values.clone()).map_err(|e| Error::Deserialization {
            message: format!("{} response: {e}", S::TYPE),
            body: values.to_string(),
        })
    }

    /// Release the channel. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.open {
            debug!(service = %self.name, "service channel shut down");
            self.open = false;
        }
    }
}

impl<S, T> fmt::Debug for ServiceClient<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("name", &self.name)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::msgs::{ListControllers, ListControllersRequest};

    #[derive(Default)]
    struct Canned {
        reply: Value,
        calls: Mutex<Vec<String>>,
    }

    impl Transport for Canned {
        async fn call_raw(&self, service: &str, _args: Value) -> Result<Value, Error> {
            self.calls.lock().unwrap().push(service.to_owned());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn call_decodes_typed_response() {
        let transport = Arc::new(Canned {
            reply: json!({ "controller": [{ "name": "a", "state": "running", "type": "T" }] }),
            ..Default::default()
        });
        let client: ServiceClient<ListControllers, _> =
            ServiceClient::new("/ns/controller_manager/list_controllers", Arc::clone(&transport));

        let resp = client.call(&ListControllersRequest {}).await.unwrap();
        assert_eq!(resp.controller[0].name, "a");
        assert_eq!(
            *transport.calls.lock().unwrap(),
            vec!["/ns/controller_manager/list_controllers".to_owned()]
        );
    }

    #[tokio::test]
    async fn shutdown_blocks_further_calls() {
        let transport = Arc::new(Canned::default());
        let mut client: ServiceClient<ListControllers, _> =
            ServiceClient::new("/list", Arc::clone(&transport));

        client.shutdown();
        client.shutdown();
        assert!(!client.is_open());

        let err = client.call(&ListControllersRequest {}).await.unwrap_err();
        assert!(matches!(err, Error::ChannelClosed { .. }));
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_response_is_deserialization_error() {
        let transport = Arc::new(Canned {
            reply: json!({ "controller": "nope" }),
            ..Default::default()
        });
        let client: ServiceClient<ListControllers, _> = ServiceClient::new("/list", transport);

        let err = client.call(&ListControllersRequest {}).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
