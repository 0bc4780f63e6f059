// ── Remote service gateway ──
//
// Owns the two service channels into the controller manager for the
// lifetime of one panel activation. Nothing else holds or shares them.
//
// The plain `list_controllers` / `switch_controller` calls never fail:
// transport errors degrade to an empty snapshot or `false` and are only
// logged. The `try_*` variants expose the underlying error for callers
// that want to surface it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ctlmgr_api::{
    ListControllers, ListControllersRequest, ServiceClient, SwitchController, Transport,
};

use crate::command::SwitchRequest;
use crate::error::CoreError;
use crate::snapshot::Snapshot;

/// `{prefix}/controller_manager/list_controllers`
pub fn list_service_name(namespace_prefix: &str) -> String {
    format!("{namespace_prefix}/controller_manager/list_controllers")
}

/// `{prefix}/controller_manager/switch_controller`
pub fn switch_service_name(namespace_prefix: &str) -> String {
    format!("{namespace_prefix}/controller_manager/switch_controller")
}

struct Channels<T> {
    list: ServiceClient<ListControllers, T>,
    switch: ServiceClient<SwitchController, T>,
}

impl<T: Transport> Channels<T> {
    fn shutdown(&mut self) {
        self.list.shutdown();
        self.switch.shutdown();
    }
}

/// Request/response access to one controller manager.
pub struct Gateway<T> {
    transport: Arc<T>,
    channels: Option<Channels<T>>,
}

impl<T: Transport> Gateway<T> {
    /// A gateway with no channels bound yet.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            channels: None,
        }
    }

    /// The shared transport underneath both channels.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Bind both channels under `namespace_prefix`.
    ///
    /// Calling again replaces the previous channels after shutting them down.
    pub fn configure(&mut self, namespace_prefix: &str) {
        if let Some(mut old) = self.channels.take() {
            debug!("replacing previously configured service channels");
            old.shutdown();
        }

        let list: ServiceClient<ListControllers, T> =
            ServiceClient::new(list_service_name(namespace_prefix), Arc::clone(&self.transport));
        let switch: ServiceClient<SwitchController, T> =
            ServiceClient::new(switch_service_name(namespace_prefix), Arc::clone(&self.transport));
        info!(
            list = list.name(),
            switch = switch.name(),
            "controller manager channels configured"
        );
        self.channels = Some(Channels { list, switch });
    }

    pub fn is_configured(&self) -> bool {
        self.channels.is_some()
    }

    /// `(list, switch)` endpoint names while configured.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        self.channels
            .as_ref()
            .map(|c| (c.list.name(), c.switch.name()))
    }

    /// Fetch a fresh snapshot, surfacing any failure.
    pub async fn try_list_controllers(&self) -> Result<Snapshot, CoreError> {
        let channels = self.channels.as_ref().ok_or(CoreError::NotConfigured)?;
        let response = channels.list.call(&ListControllersRequest {}).await?;
        debug!(count = response.controller.len(), "controller list received");
        Ok(Snapshot::from_response(response))
    }

    /// Fetch a fresh snapshot; any failure yields an empty one.
    pub async fn list_controllers(&self) -> Snapshot {
        match self.try_list_controllers().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "list_controllers failed, showing empty list");
                Snapshot::empty()
            }
        }
    }

    /// Issue a switch request, surfacing any failure.
    ///
    /// `Ok(false)` means the controller manager answered and rejected it.
    pub async fn try_switch_controller(&self, request: &SwitchRequest) -> Result<bool, CoreError> {
        let channels = self.channels.as_ref().ok_or(CoreError::NotConfigured)?;
        let response = channels.switch.call(&request.to_wire()).await?;
        Ok(response.ok)
    }

    /// Issue a switch request. `true` only when the service accepted it.
    pub async fn switch_controller(&self, request: &SwitchRequest) -> bool {
        match self.try_switch_controller(request).await {
            Ok(accepted) => {
                if !accepted {
                    warn!(?request, "switch_controller rejected");
                }
                accepted
            }
            Err(e) => {
                warn!(error = %e, ?request, "switch_controller failed");
                false
            }
        }
    }

    /// Release both channels. Safe without `configure` and safe to repeat.
    pub fn teardown(&mut self) {
        if let Some(mut channels) = self.channels.take() {
            channels.shutdown();
            info!("controller manager channels released");
        }
    }
}
