// ── Controller registry snapshot ──
//
// The full controller list as of one refresh. A snapshot is never patched:
// every refresh builds a new one and the previous one is dropped wholesale.

use serde::Serialize;

use ctlmgr_api::ListControllersResponse;

use crate::model::ControllerDescriptor;

/// Descriptors in the order the controller manager reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    controllers: Vec<ControllerDescriptor>,
}

impl Snapshot {
    /// The empty snapshot shown when a list call fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build one descriptor per reported controller, preserving report order.
    pub fn from_response(response: ListControllersResponse) -> Self {
        Self {
            controllers: response
                .controller
                .into_iter()
                .map(ControllerDescriptor::from)
                .collect(),
        }
    }

    /// Rows in ascending name order, as the panel displays them.
    ///
    /// The sort is stable, so duplicate names keep their report order.
    pub fn sorted_by_name(&self) -> Vec<ControllerDescriptor> {
        let mut rows = self.controllers.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn get(&self, name: &str) -> Option<&ControllerDescriptor> {
        self.controllers.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerDescriptor> {
        self.controllers.iter()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl From<Vec<ControllerDescriptor>> for Snapshot {
    fn from(controllers: Vec<ControllerDescriptor>) -> Self {
        Self { controllers }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::ControllerState;

    fn response(raw: serde_json::Value) -> ListControllersResponse {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn builds_arm_controller_row() {
        let snap = Snapshot::from_response(response(json!({
            "controller": [{
                "name": "arm_controller",
                "state": "running",
                "type": "PositionController",
                "claimed_resources": [
                    { "hardware_interface": "hw1", "resources": ["joint1", "joint2"] }
                ]
            }]
        })));

        let arm = snap.get("arm_controller").unwrap();
        assert_eq!(arm.state, ControllerState::Running);
        assert_eq!(arm.controller_type, "PositionController");
        assert_eq!(arm.hardware_interfaces_display(), "hw1");
        assert_eq!(arm.resources_display(), "joint1,joint2");
    }

    #[test]
    fn builder_keeps_report_order_and_display_sorts() {
        let snap = Snapshot::from_response(response(json!({
            "controller": [
                { "name": "zeta", "state": "stopped" },
                { "name": "alpha", "state": "running" },
                { "name": "mid", "state": "initialized" }
            ]
        })));

        let reported: Vec<_> = snap.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(reported, vec!["zeta", "alpha", "mid"]);

        let displayed: Vec<_> = snap.sorted_by_name().into_iter().map(|c| c.name).collect();
        assert_eq!(displayed, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn empty_response_is_empty_snapshot() {
        let snap = Snapshot::from_response(ListControllersResponse::default());
        assert!(snap.is_empty());
        assert_eq!(snap, Snapshot::empty());
    }
}
