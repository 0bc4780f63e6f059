#![allow(clippy::unwrap_used)]
// Integration tests for `RosbridgeClient` against an in-process rosbridge stand-in.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use ctlmgr_api::{
    Error, ListControllers, ListControllersRequest, RosbridgeClient, RosbridgeConfig,
    ServiceClient, SwitchController, SwitchControllerRequest, Transport,
};

// ── Helpers ─────────────────────────────────────────────────────────

type Handler = Box<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

/// Start a one-connection rosbridge stand-in. Every `call_service` frame is
/// recorded and answered with whatever frames `handler` returns.
async fn fake_rosbridge(handler: Handler) -> (RosbridgeConfig, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let frame: Value = serde_json::from_str(&text).unwrap();
            recorded.lock().unwrap().push(frame.clone());
            for reply in handler(&frame) {
                ws.send(Message::text(reply.to_string())).await.unwrap();
            }
        }
    });

    let config =
        RosbridgeConfig::new(&format!("ws://{addr}"), Duration::from_millis(500)).unwrap();
    (config, seen)
}

fn response(frame: &Value, values: Value) -> Value {
    json!({
        "op": "service_response",
        "id": frame["id"],
        "service": frame["service"],
        "values": values,
        "result": true
    })
}

// ── Service calls ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_controllers_round_trip() {
    let (config, seen) = fake_rosbridge(Box::new(|frame: &Value| {
        vec![response(
            frame,
            json!({
                "controller": [{
                    "name": "arm_controller",
                    "state": "running",
                    "type": "PositionController",
                    "claimed_resources": [
                        { "hardware_interface": "hw1", "resources": ["joint1", "joint2"] }
                    ]
                }]
            }),
        )]
    }))
    .await;

    let client = Arc::new(RosbridgeClient::connect(&config).await.unwrap());
    let list: ServiceClient<ListControllers, _> = ServiceClient::new(
        "/campero/controller_manager/list_controllers",
        Arc::clone(&client),
    );

    let resp = list.call(&ListControllersRequest {}).await.unwrap();
    assert_eq!(resp.controller.len(), 1);
    assert_eq!(resp.controller[0].name, "arm_controller");
    assert_eq!(
        resp.controller[0].claimed_resources[0].resources,
        vec!["joint1", "joint2"]
    );

    let frames = seen.lock().unwrap();
    assert_eq!(frames[0]["op"], "call_service");
    assert_eq!(
        frames[0]["service"],
        "/campero/controller_manager/list_controllers"
    );
    assert_eq!(frames[0]["args"], json!({}));
}

#[tokio::test]
async fn test_switch_controller_sends_strict_request() {
    let (config, seen) =
        fake_rosbridge(Box::new(|frame: &Value| vec![response(frame, json!({ "ok": true }))])).await;

    let client = Arc::new(RosbridgeClient::connect(&config).await.unwrap());
    let switch: ServiceClient<SwitchController, _> = ServiceClient::new(
        "/campero/controller_manager/switch_controller",
        Arc::clone(&client),
    );

    let req = SwitchControllerRequest {
        stop_controllers: vec!["arm_controller".into()],
        strictness: SwitchControllerRequest::STRICT,
        ..Default::default()
    };
    let resp = switch.call(&req).await.unwrap();
    assert!(resp.ok);

    let frames = seen.lock().unwrap();
    assert_eq!(
        frames[0]["args"],
        json!({
            "start_controllers": [],
            "stop_controllers": ["arm_controller"],
            "strictness": 2
        })
    );
}

#[tokio::test]
async fn test_unrelated_frames_are_skipped() {
    let (config, _) = fake_rosbridge(Box::new(|frame: &Value| {
        vec![
            json!({ "op": "status", "level": "warning", "msg": "noise" }),
            json!({ "op": "service_response", "id": "someone-else", "values": {}, "result": true }),
            response(frame, json!({ "ok": true })),
        ]
    }))
    .await;

    let client = RosbridgeClient::connect(&config).await.unwrap();
    let values = client.call_raw("/switch", json!({})).await.unwrap();
    assert_eq!(values, json!({ "ok": true }));
}

#[tokio::test]
async fn test_failed_service_call() {
    let (config, _) = fake_rosbridge(Box::new(|frame: &Value| {
        vec![json!({
            "op": "service_response",
            "id": frame["id"],
            "values": "Service /nope does not exist",
            "result": false
        })]
    }))
    .await;

    let client = RosbridgeClient::connect(&config).await.unwrap();
    let result = client.call_raw("/nope", json!({})).await;

    assert!(
        matches!(result, Err(Error::ServiceFailed { ref service, .. }) if service == "/nope"),
        "expected ServiceFailed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_call_times_out_without_response() {
    let (config, _) = fake_rosbridge(Box::new(|_: &Value| Vec::new())).await;

    let client = RosbridgeClient::connect(&config).await.unwrap();
    let result = client.call_raw("/silent", json!({})).await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_get_param_decodes_rosapi_value() {
    let (config, seen) = fake_rosbridge(Box::new(|frame: &Value| {
        vec![response(frame, json!({ "value": "\"/ur5\"" }))]
    }))
    .await;

    let client = RosbridgeClient::connect(&config).await.unwrap();
    let value = client
        .get_param("/rqt_plugins/parameters/prefix_name_space")
        .await
        .unwrap();
    assert_eq!(value.as_deref(), Some("/ur5"));

    let frames = seen.lock().unwrap();
    assert_eq!(frames[0]["service"], "/rosapi/get_param");
    assert_eq!(
        frames[0]["args"]["name"],
        "/rqt_plugins/parameters/prefix_name_space"
    );
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_close_is_idempotent_and_blocks_calls() {
    let (config, _) =
        fake_rosbridge(Box::new(|frame: &Value| vec![response(frame, json!({}))])).await;

    let client = RosbridgeClient::connect(&config).await.unwrap();
    assert!(client.is_connected().await);

    client.close().await;
    client.close().await;
    assert!(!client.is_connected().await);

    let result = client.call_raw("/anything", json!({})).await;
    assert!(matches!(result, Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config =
        RosbridgeConfig::new(&format!("ws://{addr}"), Duration::from_millis(500)).unwrap();
    let result = RosbridgeClient::connect(&config).await;
    assert!(matches!(result, Err(Error::WebSocketConnect(_))));
}
