// ctlmgr-api: rosbridge client for the ROS controller_manager services

pub mod error;
pub mod msgs;
pub mod rosbridge;
pub mod service;
pub mod transport;

pub use error::Error;
pub use msgs::{
    ControllerState, HardwareInterfaceResources, ListControllers, ListControllersRequest,
    ListControllersResponse, SwitchController, SwitchControllerRequest, SwitchControllerResponse,
};
pub use rosbridge::RosbridgeClient;
pub use service::{Service, ServiceClient};
pub use transport::{RosbridgeConfig, Transport};
