// ── Switch command model ──
//
// The only write operation the panel performs is a single-controller
// start or stop. `ControllerAction` decides what the context menu may offer,
// `SwitchRequest` is what goes over the wire.

use serde::Serialize;
use strum::{Display, EnumIter};

use ctlmgr_api::SwitchControllerRequest;

use crate::model::ControllerState;

/// Atomicity of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
pub enum Strictness {
    /// Apply whatever transitions succeed.
    BestEffort,
    /// All transitions succeed or the whole request is rejected.
    #[default]
    Strict,
}

impl Strictness {
    /// Integer constant used by `controller_manager_msgs/SwitchController`.
    pub fn as_wire(self) -> i32 {
        match self {
            Self::BestEffort => SwitchControllerRequest::BEST_EFFORT,
            Self::Strict => SwitchControllerRequest::STRICT,
        }
    }
}

/// A context-menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum ControllerAction {
    Start,
    Stop,
}

impl ControllerAction {
    /// The single action offered for a row in `state`, if any.
    ///
    /// `running` offers Stop, `stopped` offers Start. Every other state
    /// offers nothing.
    pub fn offered_for(state: &ControllerState) -> Option<Self> {
        match state {
            ControllerState::Running => Some(Self::Stop),
            ControllerState::Stopped => Some(Self::Start),
            ControllerState::Other(_) => None,
        }
    }

    /// Menu entry text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start Controller",
            Self::Stop => "Stop Controller",
        }
    }
}

/// A request to start and/or stop controllers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchRequest {
    pub start_controllers: Vec<String>,
    pub stop_controllers: Vec<String>,
    pub strictness: Strictness,
}

impl SwitchRequest {
    /// A strict request moving exactly one controller.
    pub fn for_action(name: &str, action: ControllerAction) -> Self {
        let (start_controllers, stop_controllers) = match action {
            ControllerAction::Start => (vec![name.to_owned()], Vec::new()),
            ControllerAction::Stop => (Vec::new(), vec![name.to_owned()]),
        };
        Self {
            start_controllers,
            stop_controllers,
            strictness: Strictness::Strict,
        }
    }

    pub fn to_wire(&self) -> SwitchControllerRequest {
        SwitchControllerRequest {
            start_controllers: self.start_controllers.clone(),
            stop_controllers: self.stop_controllers.clone(),
            strictness: self.strictness.as_wire(),
            ..Default::default()
        }
    }
}
