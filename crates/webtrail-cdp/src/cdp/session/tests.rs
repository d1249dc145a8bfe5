use serde_json::json;
use webtrail_protocols::PageEvent;

use super::events::{NetworkTracker, translate_event};

#[test]
fn test_translate_binding_called() {
    let event = translate_event(
        "Runtime.bindingCalled",
        &json!({"name": "__webtrailEmit", "payload": "{\"kind\":\"click\"}"}),
        None,
    );
    assert_eq!(
        event,
        Some(PageEvent::BindingCalled {
            name: "__webtrailEmit".to_string(),
            payload: "{\"kind\":\"click\"}".to_string(),
        })
    );
}

#[test]
fn test_translate_main_frame_navigation() {
    let event = translate_event(
        "Page.frameNavigated",
        &json!({"frame": {"id": "F1", "url": "https://example.com/next"}}),
        Some("F1"),
    );
    assert_eq!(
        event,
        Some(PageEvent::Navigated {
            url: "https://example.com/next".to_string(),
            same_document: false,
        })
    );
}

#[test]
fn test_translate_ignores_subframes() {
    let event = translate_event(
        "Page.frameNavigated",
        &json!({"frame": {"id": "F2", "parentId": "F1", "url": "https://ads.example"}}),
        Some("F1"),
    );
    assert!(event.is_none());

    let event = translate_event(
        "Page.navigatedWithinDocument",
        &json!({"frameId": "F2", "url": "https://example.com/#x"}),
        Some("F1"),
    );
    assert!(event.is_none());
}

#[test]
fn test_translate_same_document_navigation() {
    let event = translate_event(
        "Page.navigatedWithinDocument",
        &json!({"frameId": "F1", "url": "https://example.com/app#/inbox"}),
        Some("F1"),
    );
    assert!(matches!(
        event,
        Some(PageEvent::Navigated { same_document: true, .. })
    ));
}

#[test]
fn test_translate_lifecycle() {
    assert_eq!(
        translate_event("Page.loadEventFired", &json!({}), None),
        Some(PageEvent::Loaded)
    );
    assert_eq!(
        translate_event("Inspector.detached", &json!({}), None),
        Some(PageEvent::Closed)
    );
    assert!(translate_event("Network.dataReceived", &json!({}), None).is_none());
}

#[test]
fn test_network_tracker_idle() {
    let tracker = NetworkTracker::default();
    assert!(tracker.idle_for().is_some());

    tracker.started("r1");
    tracker.started("r2");
    assert!(tracker.idle_for().is_none());
    assert_eq!(tracker.inflight(), 2);

    tracker.finished("r1");
    assert!(tracker.idle_for().is_none());
    tracker.finished("r2");
    assert!(tracker.idle_for().is_some());

    tracker.started("r3");
    tracker.reset();
    assert_eq!(tracker.inflight(), 0);
}

fn event(method: &str, params: serde_json::Value) -> crate::cdp::protocol::CdpResponse {
    crate::cdp::protocol::CdpResponse {
        id: None,
        result: None,
        error: None,
        method: Some(method.to_string()),
        params: Some(params),
        session_id: Some("S1".to_string()),
    }
}

#[tokio::test]
async fn test_event_pump_forgets_requests_of_previous_document() {
    use std::sync::Arc;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let (events, mut page_events) = tokio::sync::broadcast::channel(16);
    let network = Arc::new(NetworkTracker::default());
    let main_frame = Arc::new(parking_lot::Mutex::new(None));
    let pump = super::events::spawn_event_pump(rx, events, network.clone(), main_frame.clone());

    tx.send(event("Network.requestWillBeSent", json!({"requestId": "stale"}))).unwrap();
    tx.send(event(
        "Page.frameNavigated",
        json!({"frame": {"id": "F1", "url": "https://example.com/next"}}),
    ))
    .unwrap();
    drop(tx);
    pump.await.unwrap();

    assert_eq!(network.inflight(), 0);
    assert_eq!(main_frame.lock().as_deref(), Some("F1"));
    assert_eq!(
        page_events.recv().await.unwrap(),
        PageEvent::Navigated {
            url: "https://example.com/next".into(),
            same_document: false,
        }
    );
}
