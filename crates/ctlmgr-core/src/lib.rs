// ctlmgr-core: controller snapshot, switch dispatch and panel lifecycle.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod model;
pub mod panel;
pub mod snapshot;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod mock;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{ControllerAction, Strictness, SwitchRequest};
pub use config::{DEFAULT_NAMESPACE_PREFIX, PanelConfig};
pub use dispatcher::{DispatchOutcome, DispatchState, Dispatcher};
pub use error::CoreError;
pub use gateway::Gateway;
pub use model::{ClaimedResources, ControllerDescriptor, ControllerState};
pub use panel::Panel;
pub use snapshot::Snapshot;
