// ── Action dispatcher ──
//
// Turns a confirmed menu choice into a switch request, then refreshes.
// The refresh happens whether or not the switch was accepted; a failed
// switch is only visible because the fresh snapshot still shows the old
// state.

use tracing::{debug, info};

use ctlmgr_api::Transport;

use crate::command::{ControllerAction, SwitchRequest};
use crate::gateway::Gateway;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatching,
}

/// Result of one dispatch: what was sent, whether it was accepted, and the
/// snapshot fetched right after.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub request: SwitchRequest,
    pub accepted: bool,
    pub snapshot: Snapshot,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    state: DispatchState,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Switch `name` per `action`, then fetch exactly one fresh snapshot.
    pub async fn dispatch<T: Transport>(
        &mut self,
        gateway: &Gateway<T>,
        name: &str,
        action: ControllerAction,
    ) -> DispatchOutcome {
        let request = SwitchRequest::for_action(name, action);
        self.state = DispatchState::Dispatching;
        debug!(controller = name, %action, "dispatching switch");

        let accepted = gateway.switch_controller(&request).await;
        self.state = DispatchState::Idle;
        info!(controller = name, %action, accepted, "switch finished");

        let snapshot = gateway.list_controllers().await;
        DispatchOutcome {
            request,
            accepted,
            snapshot,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::MockControllerManager;
    use crate::model::ControllerState;

    const LIST: &str = "/campero/controller_manager/list_controllers";
    const SWITCH: &str = "/campero/controller_manager/switch_controller";

    fn gateway(mock: MockControllerManager) -> Gateway<MockControllerManager> {
        let mut gw = Gateway::new(Arc::new(mock));
        gw.configure("/campero");
        gw
    }

    #[tokio::test]
    async fn stop_then_exactly_one_refresh() {
        let gw = gateway(MockControllerManager::new(&[("arm_controller", "running")]));
        let mut dispatcher = Dispatcher::new();

        let outcome = dispatcher
            .dispatch(&gw, "arm_controller", ControllerAction::Stop)
            .await;

        assert!(outcome.accepted);
        assert_eq!(outcome.request.stop_controllers, vec!["arm_controller"]);
        assert!(outcome.request.start_controllers.is_empty());
        assert_eq!(
            outcome.snapshot.get("arm_controller").unwrap().state,
            ControllerState::Stopped
        );
        assert_eq!(gw.transport().call_names(), vec![SWITCH, LIST]);
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[tokio::test]
    async fn rejected_switch_still_refreshes_and_shows_prior_state() {
        let mut mock = MockControllerManager::new(&[("gripper", "stopped")]);
        mock.accept_switch = false;
        let gw = gateway(mock);
        let mut dispatcher = Dispatcher::new();

        let outcome = dispatcher.dispatch(&gw, "gripper", ControllerAction::Start).await;

        assert!(!outcome.accepted);
        assert_eq!(
            outcome.snapshot.get("gripper").unwrap().state,
            ControllerState::Stopped
        );
        assert_eq!(gw.transport().call_names(), vec![SWITCH, LIST]);
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[tokio::test]
    async fn transport_failure_still_refreshes() {
        let mut mock = MockControllerManager::new(&[("gripper", "stopped")]);
        mock.fail_switch = true;
        let gw = gateway(mock);

        let outcome = Dispatcher::new()
            .dispatch(&gw, "gripper", ControllerAction::Start)
            .await;

        assert!(!outcome.accepted);
        assert_eq!(outcome.snapshot.len(), 1);
        assert_eq!(gw.transport().call_names(), vec![SWITCH, LIST]);
    }
}
