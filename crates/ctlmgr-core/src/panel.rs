// ── Panel lifecycle ──
//
// What the host drives: `start` once per activation, then any number of
// refreshes and dispatches, then `stop`. The panel keeps only the last
// fetched snapshot; nothing survives `stop`.

use std::sync::Arc;

use tracing::{info, warn};

use ctlmgr_api::Transport;

use crate::command::ControllerAction;
use crate::config::PanelConfig;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::snapshot::Snapshot;

/// Controller manager panel bound to one transport.
pub struct Panel<T> {
    gateway: Gateway<T>,
    dispatcher: Dispatcher,
    snapshot: Snapshot,
}

impl<T: Transport> Panel<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            gateway: Gateway::new(transport),
            dispatcher: Dispatcher::new(),
            snapshot: Snapshot::empty(),
        }
    }

    /// Activate: bind the service channels and fetch the first snapshot.
    pub async fn start(&mut self, config: &PanelConfig) -> &Snapshot {
        info!(namespace = %config.namespace_prefix, "panel starting");
        self.gateway.configure(&config.namespace_prefix);
        self.refresh().await
    }

    /// Like [`start`](Self::start), but reports why the first fetch failed.
    pub async fn try_start(&mut self, config: &PanelConfig) -> Result<&Snapshot, CoreError> {
        info!(namespace = %config.namespace_prefix, "panel starting");
        self.gateway.configure(&config.namespace_prefix);
        self.try_refresh().await
    }

    /// Replace the snapshot with a freshly fetched one.
    pub async fn refresh(&mut self) -> &Snapshot {
        self.snapshot = self.gateway.list_controllers().await;
        &self.snapshot
    }

    /// Replace the snapshot, surfacing the failure. The snapshot is
    /// emptied when the fetch fails, same as [`refresh`](Self::refresh).
    pub async fn try_refresh(&mut self) -> Result<&Snapshot, CoreError> {
        match self.gateway.try_list_controllers().await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                Ok(&self.snapshot)
            }
            Err(e) => {
                warn!(error = %e, "list_controllers failed, showing empty list");
                self.snapshot = Snapshot::empty();
                Err(e)
            }
        }
    }

    /// Switch one controller and adopt the snapshot fetched afterwards.
    pub async fn dispatch(&mut self, name: &str, action: ControllerAction) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(&self.gateway, name, action).await;
        self.snapshot = outcome.snapshot.clone();
        outcome
    }

    /// Deactivate. Safe to call repeatedly or before `start`.
    pub fn stop(&mut self) {
        self.gateway.teardown();
        self.snapshot = Snapshot::empty();
        info!("panel stopped");
    }

    /// The last fetched snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    // Settings hooks exist for host parity; the panel persists nothing.
    pub fn save_settings(&self) {}

    pub fn restore_settings(&mut self) {}
}
