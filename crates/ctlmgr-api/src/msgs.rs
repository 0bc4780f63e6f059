// controller_manager_msgs service types
//
// JSON mirrors of the ROS message definitions as rosbridge encodes them.
// Fields use `#[serde(default)]` because older controller managers omit
// `claimed_resources`, `start_asap` and `timeout`.

use serde::{Deserialize, Serialize};

use crate::service::Service;

// ── Shared messages ──────────────────────────────────────────────────

/// `controller_manager_msgs/HardwareInterfaceResources`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareInterfaceResources {
    #[serde(default)]
    pub hardware_interface: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// `controller_manager_msgs/ControllerState`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub name: String,
    /// `"running"`, `"stopped"`, `"initialized"`, ...
    #[serde(default)]
    pub state: String,
    #[serde(rename = "type", default)]
    pub controller_type: String,
    #[serde(default)]
    pub claimed_resources: Vec<HardwareInterfaceResources>,
}

// ── ListControllers ──────────────────────────────────────────────────

/// `controller_manager_msgs/ListControllers`
pub struct ListControllers;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListControllersRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListControllersResponse {
    #[serde(default)]
    pub controller: Vec<ControllerState>,
}

impl Service for ListControllers {
    const TYPE: &'static str = "controller_manager_msgs/ListControllers";
    type Request = ListControllersRequest;
    type Response = ListControllersResponse;
}

// ── SwitchController ─────────────────────────────────────────────────

/// `controller_manager_msgs/SwitchController`
pub struct SwitchController;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchControllerRequest {
    #[serde(default)]
    pub start_controllers: Vec<String>,
    #[serde(default)]
    pub stop_controllers: Vec<String>,
    #[serde(default)]
    pub strictness: i32,
    // Only sent when set: rosbridge rejects fields unknown to older msg definitions.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub start_asap: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: f64,
}

impl SwitchControllerRequest {
    pub const BEST_EFFORT: i32 = 1;
    pub const STRICT: i32 = 2;
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchControllerResponse {
    #[serde(default)]
    pub ok: bool,
}

impl Service for SwitchController {
    const TYPE: &'static str = "controller_manager_msgs/SwitchController";
    type Request = SwitchControllerRequest;
    type Response = SwitchControllerResponse;
}
