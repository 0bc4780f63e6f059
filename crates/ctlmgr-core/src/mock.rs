// In-memory controller manager used by unit tests.
//
// Answers list/switch calls on any `.../controller_manager/...` endpoint,
// applies accepted switches to its own state, and records every call.

use std::sync::Mutex;

use serde_json::{Value, json};

use ctlmgr_api::{Error, Transport};

pub(crate) struct MockControllerManager {
    controllers: Mutex<Vec<(String, String)>>,
    pub(crate) accept_switch: bool,
    pub(crate) fail_list: bool,
    pub(crate) fail_switch: bool,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockControllerManager {
    /// `controllers` is `(name, state)` in report order.
    pub(crate) fn new(controllers: &[(&str, &str)]) -> Self {
        Self {
            controllers: Mutex::new(
                controllers
                    .iter()
                    .map(|(n, s)| ((*n).to_owned(), (*s).to_owned()))
                    .collect(),
            ),
            accept_switch: true,
            fail_list: false,
            fail_switch: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Service names only, in call order.
    pub(crate) fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }

    fn list(&self) -> Value {
        let controllers = self.controllers.lock().unwrap();
        let rows: Vec<Value> = controllers
            .iter()
            .map(|(name, state)| {
                json!({
                    "name": name,
                    "state": state,
                    "type": "effort_controllers/JointTrajectoryController",
                    "claimed_resources": [{
                        "hardware_interface": "hardware_interface::EffortJointInterface",
                        "resources": [format!("{name}_joint")]
                    }]
                })
            })
            .collect();
        json!({ "controller": rows })
    }

    fn switch(&self, args: &Value) -> Value {
        if !self.accept_switch {
            return json!({ "ok": false });
        }
        let mut controllers = self.controllers.lock().unwrap();
        let transitions = [("start_controllers", "running"), ("stop_controllers", "stopped")];
        for (key, new_state) in transitions {
            for name in args[key].as_array().into_iter().flatten() {
                let Some(name) = name.as_str() else { continue };
                if let Some(entry) = controllers.iter_mut().find(|(n, _)| n == name) {
                    entry.1 = new_state.to_owned();
                }
            }
        }
        json!({ "ok": true })
    }
}

impl Transport for MockControllerManager {
    async fn call_raw(&self, service: &str, args: Value) -> Result<Value, Error> {
        self.calls
            .lock()
            .unwrap()
            .push((service.to_owned(), args.clone()));

        if service.ends_with("/controller_manager/list_controllers") {
            if self.fail_list {
                return Err(Error::WebSocketClosed {
                    reason: "stream ended".into(),
                });
            }
            Ok(self.list())
        } else if service.ends_with("/controller_manager/switch_controller") {
            if self.fail_switch {
                return Err(Error::Timeout {
                    service: service.to_owned(),
                    timeout_secs: 30,
                });
            }
            Ok(self.switch(&args))
        } else {
            Err(Error::ServiceFailed {
                service: service.to_owned(),
                message: format!("Service {service} does not exist"),
            })
        }
    }
}
