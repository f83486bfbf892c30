//! Integration tests for the wisp bridge.
//!
//! Sessions are in-memory channels standing in for the websocket, so these
//! tests exercise dispatch, correlation and the connection lifecycle without
//! a running server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use wisp_core::config::{CalculatorConfig, QueryConfig};
use wisp_core::plugins::CalculatorPlugin;
use wisp_core::{PluginApi, PluginManager, TraceContext};
use wisp_daemon::images::ImageRegistry;
use wisp_daemon::{
    Bridge, ConnectionPhase, DaemonError, HostApi, Outbound, RequestHandler, WispHandler,
};
use wisp_rpc::{Message, RequestId, methods};
use wisp_types::PlainQuery;

/// Handler with one method per behavior under test
struct TestHandler;

impl RequestHandler for TestHandler {
    async fn handle(&self, _ctx: &TraceContext, request: &Message) -> wisp_daemon::Result<Value> {
        match request.method.as_str() {
            "Echo" => Ok(request.data.clone()),
            "Slow" => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(request.data.clone())
            }
            "Fail" => Err(DaemonError::InvalidParams("bad input".to_string())),
            "Panic" => panic!("handler blew up"),
            other => Err(DaemonError::MethodNotFound(other.to_string())),
        }
    }
}

fn frame(id: impl Into<RequestId>, method: &str, data: Value) -> String {
    serde_json::to_string(&Message::request(id, method, data)).unwrap()
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<String>) -> Message {
    let frame = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("session closed");
    serde_json::from_str(&frame).unwrap()
}

fn connected<H: RequestHandler>(
    bridge: Bridge<H>,
) -> (Arc<Bridge<H>>, mpsc::UnboundedReceiver<String>) {
    let bridge = Arc::new(bridge);
    let (tx, rx) = mpsc::unbounded_channel();
    bridge.connect(tx).unwrap();
    (bridge, rx)
}

fn counting_bridge(delay: Duration) -> (Bridge<TestHandler>, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let bridge = Bridge::new(TestHandler, delay).with_ready_hook(move |outbound: &Outbound| {
        counter.fetch_add(1, Ordering::SeqCst);
        outbound.request_ui(methods::SHOW_APP, Value::Null);
    });
    (bridge, fired)
}

#[tokio::test]
async fn test_response_echoes_request_id() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    bridge
        .dispatch_frame(&frame("req-1", "Echo", json!({"hello": "world"})))
        .unwrap()
        .await
        .unwrap();

    let response = next_message(&mut rx).await;
    assert!(response.is_response());
    assert!(response.success);
    assert_eq!(response.id, RequestId::from("req-1"));
    assert_eq!(response.method, "Echo");
    assert_eq!(response.data, json!({"hello": "world"}));
}

#[tokio::test]
async fn test_concurrent_requests_correlate_by_id() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    let slow = bridge
        .dispatch_frame(&frame("slow", "Slow", json!("slow")))
        .unwrap();
    let mut handles = vec![slow];
    for i in 0..10u64 {
        handles.push(
            bridge
                .dispatch_frame(&frame(i, "Echo", json!({ "n": i })))
                .unwrap(),
        );
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut responses = Vec::new();
    for _ in 0..11 {
        responses.push(next_message(&mut rx).await);
    }

    // The slow request was dispatched first but must not hold up the rest.
    assert_ne!(responses[0].id, RequestId::from("slow"));
    assert_eq!(responses[10].id, RequestId::from("slow"));

    for response in &responses[..10] {
        let RequestId::Number(n) = response.id else {
            panic!("unexpected id {}", response.id);
        };
        assert_eq!(response.data, json!({ "n": n }));
    }
}

#[tokio::test]
async fn test_malformed_frame_is_dropped() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    assert!(
        bridge
            .dispatch_frame(r#"{"Type":"WebsocketMsgTypeRequest", nope"#)
            .is_none()
    );
    assert!(bridge.dispatch_frame("not even json").is_none());

    let stray_response = Message::success(&Message::request(9, "Echo", Value::Null), json!(1));
    assert!(
        bridge
            .dispatch_frame(&serde_json::to_string(&stray_response).unwrap())
            .is_none()
    );

    bridge
        .dispatch_frame(&frame(2, "Echo", json!("still alive")))
        .unwrap()
        .await
        .unwrap();
    let response = next_message(&mut rx).await;
    assert_eq!(response.id, RequestId::Number(2));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_request_without_id_or_method_gets_failure_response() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    bridge
        .dispatch_frame(r#"{"Type":"WebsocketMsgTypeRequest","Data":null}"#)
        .expect("request should be dispatched")
        .await
        .unwrap();
    let response = next_message(&mut rx).await;
    assert!(response.is_response());
    assert!(!response.success);
    assert_eq!(response.id, RequestId::default());
    assert_eq!(response.data, json!("Method not found: "));
}

#[tokio::test]
async fn test_binary_frame_is_dispatched() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    bridge
        .dispatch_binary(frame(5, "Echo", json!([1, 2])).as_bytes())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(next_message(&mut rx).await.data, json!([1, 2]));

    assert!(bridge.dispatch_binary(&[0xff, 0xfe, 0x00]).is_none());
}

#[tokio::test]
async fn test_handler_errors_become_failure_responses() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    bridge
        .dispatch_frame(&frame(1, "Nope", Value::Null))
        .unwrap()
        .await
        .unwrap();
    let response = next_message(&mut rx).await;
    assert!(!response.success);
    assert_eq!(response.id, RequestId::Number(1));
    assert_eq!(response.data, json!("Method not found: Nope"));

    bridge
        .dispatch_frame(&frame(2, "Fail", Value::Null))
        .unwrap()
        .await
        .unwrap();
    let response = next_message(&mut rx).await;
    assert!(!response.success);
    assert_eq!(response.data, json!("Invalid parameters: bad input"));
}

#[tokio::test]
async fn test_handler_panic_is_contained() {
    let (bridge, mut rx) = connected(Bridge::new(TestHandler, Duration::from_secs(60)));

    bridge
        .dispatch_frame(&frame(1, "Panic", Value::Null))
        .unwrap()
        .await
        .unwrap();
    let response = next_message(&mut rx).await;
    assert!(!response.success);
    assert_eq!(response.id, RequestId::Number(1));
    assert_eq!(response.data, json!("internal error"));

    bridge
        .dispatch_frame(&frame(2, "Echo", json!("ok")))
        .unwrap()
        .await
        .unwrap();
    assert!(next_message(&mut rx).await.success);
}

#[tokio::test]
async fn test_second_session_is_rejected() {
    let bridge = Arc::new(Bridge::new(TestHandler, Duration::from_secs(60)));
    let (tx1, rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();

    bridge.connect(tx1).unwrap();
    assert!(matches!(
        bridge.connect(tx2),
        Err(DaemonError::SessionRejected)
    ));
    assert_eq!(bridge.outbound().sessions().len(), 1);

    // A session whose socket went away is replaced.
    drop(rx1);
    let (tx3, mut rx3) = mpsc::unbounded_channel();
    bridge.connect(tx3).unwrap();
    let id = bridge.outbound().request_ui(methods::SHOW_APP, Value::Null);
    assert_eq!(next_message(&mut rx3).await.id, id);
}

#[tokio::test]
async fn test_disconnect_stops_delivery() {
    let bridge = Arc::new(Bridge::new(TestHandler, Duration::from_secs(60)));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = bridge.connect(tx).unwrap();

    bridge.disconnect(&session);
    assert_eq!(bridge.lifecycle().phase(), ConnectionPhase::Disconnected);
    assert!(!bridge.outbound().sessions().is_connected());

    bridge
        .dispatch_frame(&frame(1, "Echo", Value::Null))
        .unwrap()
        .await
        .unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_ready_hook_fires_after_settle_delay() {
    let (bridge, fired) = counting_bridge(Duration::from_millis(500));
    let (bridge, mut rx) = connected(bridge);
    assert_eq!(bridge.lifecycle().phase(), ConnectionPhase::ConnectedFirst);

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let show = next_message(&mut rx).await;
    assert!(show.is_request());
    assert_eq!(show.method, methods::SHOW_APP);
}

#[tokio::test(start_paused = true)]
async fn test_ui_ready_fires_hook_early_and_once() {
    let (bridge, fired) = counting_bridge(Duration::from_millis(500));
    let (bridge, mut rx) = connected(bridge);

    bridge
        .dispatch_frame(&frame(1, methods::UI_READY, Value::Null))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let mut methods_seen = Vec::new();
    for _ in 0..2 {
        let message = next_message(&mut rx).await;
        methods_seen.push((message.method.clone(), message.is_response()));
    }
    assert!(methods_seen.contains(&(methods::SHOW_APP.to_string(), false)));
    assert!(methods_seen.contains(&(methods::UI_READY.to_string(), true)));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_does_not_rearm_ready_hook() {
    let (bridge, fired) = counting_bridge(Duration::from_millis(500));
    let bridge = Arc::new(bridge);

    let (tx, _rx) = mpsc::unbounded_channel();
    let first = bridge.connect(tx).unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    bridge.disconnect(&first);
    let (tx, _rx) = mpsc::unbounded_channel();
    bridge.connect(tx).unwrap();
    assert_eq!(
        bridge.lifecycle().phase(),
        ConnectionPhase::ConnectedSubsequent
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_before_settle_still_fires_once() {
    let (bridge, fired) = counting_bridge(Duration::from_millis(500));
    let bridge = Arc::new(bridge);

    let (tx, _rx) = mpsc::unbounded_channel();
    let session = bridge.connect(tx).unwrap();
    bridge.disconnect(&session);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(bridge.lifecycle().ready_fired());
}

/// Clipboard that stays in memory; everything else goes to the UI.
struct MemoryClipboardApi {
    host: HostApi,
    clipboard: Mutex<Vec<String>>,
}

impl PluginApi for MemoryClipboardApi {
    fn change_query(&self, ctx: &TraceContext, query: PlainQuery) {
        self.host.change_query(ctx, query);
    }

    fn copy_to_clipboard(&self, _ctx: &TraceContext, text: &str) -> wisp_core::Result<()> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn notify(&self, ctx: &TraceContext, message: &str) {
        self.host.notify(ctx, message);
    }
}

async fn call(
    bridge: &Arc<Bridge<WispHandler>>,
    rx: &mut mpsc::UnboundedReceiver<String>,
    id: u64,
    method: &str,
    data: Value,
) -> Message {
    bridge
        .dispatch_frame(&frame(id, method, data))
        .unwrap()
        .await
        .unwrap();
    loop {
        let message = next_message(rx).await;
        if message.is_response() && message.id == RequestId::Number(id) {
            return message;
        }
    }
}

#[tokio::test]
async fn test_calculator_round_trip() {
    let mut manager = PluginManager::new(&QueryConfig::default());
    let calculator = Arc::new(CalculatorPlugin::new(&CalculatorConfig::default()));
    assert!(manager.register(calculator.clone()).unwrap());
    let plugins = Arc::new(manager);

    let handler = WispHandler::new(
        plugins.clone(),
        Arc::new(ImageRegistry::new("http://127.0.0.1:34987")),
    );
    let (bridge, mut rx) = connected(Bridge::new(handler, Duration::from_secs(60)));

    let api = Arc::new(MemoryClipboardApi {
        host: HostApi::new(bridge.outbound().clone()),
        clipboard: Mutex::new(Vec::new()),
    });
    let plugin_api: Arc<dyn PluginApi> = api.clone();
    plugins.init_all(&TraceContext::new(), &plugin_api);

    // Global query: the calculator answers because the text has an operator.
    let response = call(
        &bridge,
        &mut rx,
        1,
        methods::QUERY,
        json!({"query": "1+2", "type": "input"}),
    )
    .await;
    assert!(response.success);
    let results = response.data.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["Title"], "3");
    assert_eq!(results[0]["AssociatedQuery"], "1+2");
    assert_eq!(results[0]["Actions"][0]["IsDefault"], true);
    let copy_id = results[0]["Actions"][0]["Id"].as_str().unwrap().to_string();

    let response = call(&bridge, &mut rx, 2, methods::ACTION, json!({"id": copy_id})).await;
    assert!(response.success);
    assert_eq!(api.clipboard.lock().unwrap().as_slice(), ["3"]);
    assert_eq!(calculator.history().len(), 1);

    // Keyword query: history matches come back with a recalculate action.
    let response = call(
        &bridge,
        &mut rx,
        3,
        methods::QUERY,
        json!({"query": "calculator 1+", "type": "input"}),
    )
    .await;
    let results = response.data.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["Title"], "1+2");
    assert_eq!(results[0]["SubTitle"], "3");
    let recalculate = results[0]["Actions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["Name"] == "Recalculate")
        .unwrap()["Id"]
        .as_str()
        .unwrap()
        .to_string();

    bridge
        .dispatch_frame(&frame(4, methods::ACTION, json!({"id": recalculate})))
        .unwrap()
        .await
        .unwrap();
    let mut change_query = None;
    let mut action_response = None;
    for _ in 0..2 {
        let message = next_message(&mut rx).await;
        if message.is_request() {
            change_query = Some(message);
        } else {
            action_response = Some(message);
        }
    }
    let change_query = change_query.unwrap();
    assert_eq!(change_query.method, methods::CHANGE_QUERY);
    assert_eq!(change_query.data, json!({"QueryType": "input", "QueryText": "1+2"}));
    assert!(action_response.unwrap().success);
    assert_eq!(calculator.history().len(), 1);
}

#[tokio::test]
async fn test_unknown_action_and_bad_params() {
    let plugins = Arc::new(PluginManager::new(&QueryConfig::default()));
    let handler = WispHandler::new(plugins, Arc::new(ImageRegistry::new("http://x")));
    let (bridge, mut rx) = connected(Bridge::new(handler, Duration::from_secs(60)));

    let response = call(&bridge, &mut rx, 1, methods::ACTION, json!({"id": "gone"})).await;
    assert!(!response.success);
    assert_eq!(response.data, json!("Action not found: gone"));

    let response = call(&bridge, &mut rx, 2, methods::QUERY, json!({"nope": 1})).await;
    assert!(!response.success);
    assert!(
        response
            .data
            .as_str()
            .unwrap()
            .starts_with("Invalid parameters")
    );

    let response = call(&bridge, &mut rx, 3, "Bogus", Value::Null).await;
    assert_eq!(response.data, json!("Method not found: Bogus"));
}

#[tokio::test]
async fn test_empty_query_returns_empty_list() {
    let plugins = Arc::new(PluginManager::new(&QueryConfig::default()));
    let handler = WispHandler::new(plugins, Arc::new(ImageRegistry::new("http://x")));
    let (bridge, mut rx) = connected(Bridge::new(handler, Duration::from_secs(60)));

    let response = call(
        &bridge,
        &mut rx,
        1,
        methods::QUERY,
        json!({"query": "", "type": "input"}),
    )
    .await;
    assert!(response.success);
    assert_eq!(response.data, json!([]));
}
