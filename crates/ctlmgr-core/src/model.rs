// ── Controller domain model ──
//
// What one row of the panel shows about a controller. Built fresh from every
// list response; nothing here carries identity across refreshes.

use std::fmt;

use serde::Serialize;

/// Lifecycle state as reported by the controller manager.
///
/// Only `running` and `stopped` drive actions; anything else (e.g.
/// `initialized`) is kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ControllerState {
    Running,
    Stopped,
    Other(String),
}

impl ControllerState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for ControllerState {
    fn from(s: &str) -> Self {
        match s {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<ControllerState> for String {
    fn from(state: ControllerState) -> Self {
        match state {
            ControllerState::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources a controller holds on one hardware interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimedResources {
    pub hardware_interface: String,
    pub resources: Vec<String>,
}

/// One controller as displayed in the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerDescriptor {
    pub name: String,
    pub state: ControllerState,
    #[serde(rename = "type")]
    pub controller_type: String,
    pub claimed_resources: Vec<ClaimedResources>,
}

impl ControllerDescriptor {
    /// Hardware interfaces, comma-joined in report order.
    pub fn hardware_interfaces_display(&self) -> String {
        self.claimed_resources
            .iter()
            .map(|c| c.hardware_interface.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Every claimed resource across all interfaces, comma-joined in report order.
    pub fn resources_display(&self) -> String {
        self.claimed_resources
            .iter()
            .flat_map(|c| c.resources.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<ctlmgr_api::ControllerState> for ControllerDescriptor {
    fn from(raw: ctlmgr_api::ControllerState) -> Self {
        Self {
            state: ControllerState::from(raw.state.as_str()),
            name: raw.name,
            controller_type: raw.controller_type,
            claimed_resources: raw
                .claimed_resources
                .into_iter()
                .map(|c| ClaimedResources {
                    hardware_interface: c.hardware_interface,
                    resources: c.resources,
                })
                .collect(),
        }
    }
}
