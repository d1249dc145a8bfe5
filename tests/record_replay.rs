//! Record a session against an in-memory page, persist it, replay it.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};
use tempfile::TempDir;
use webtrail_config::RelaxationConfig;
use webtrail_protocols::testing::StaticPage;
use webtrail_protocols::{
    Action, ActionType, BoundingBox, ElementAttributes, ElementSnapshot, ErrorKind, Point,
    Position, ResolutionMethod, Variables, Viewport, VisualDescriptor, Workflow,
};
use webtrail_recorder::capture::BINDING_NAME;
use webtrail_recorder::{MemoryBackup, Recorder, RecorderOptions};
use webtrail_replay::{ReplayController, ReplayOptions};

const URL: &str = "https://shop.example.com/login";

fn page() -> Arc<StaticPage> {
    Arc::new(
        StaticPage::new(URL, Viewport::new(1280.0, 720.0))
            .with_element(
                ElementSnapshot::new("q", "input", BoundingBox::new(100.0, 100.0, 300.0, 30.0))
                    .with_attributes(ElementAttributes {
                        name: Some("q".into()),
                        placeholder: Some("Search".into()),
                        ..Default::default()
                    }),
            )
            .with_element(
                ElementSnapshot::new("go", "button", BoundingBox::new(100.0, 200.0, 80.0, 30.0))
                    .with_text("Sign in")
                    .with_attributes(ElementAttributes {
                        id: Some("submit".into()),
                        ..Default::default()
                    }),
            ),
    )
}

fn replay_options(dir: &TempDir) -> ReplayOptions {
    ReplayOptions {
        max_retries: 2,
        retry_delay: Duration::from_millis(10),
        stop_on_error: false,
        debug: false,
        debug_dir: dir.path().join("debug"),
        artifacts_dir: dir.path().join("failures"),
        timeout: None,
        relaxation: RelaxationConfig::default(),
        stability_idle: Duration::from_millis(1),
        stability_timeout: Duration::from_millis(10),
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn viewport() -> Value {
    json!({"width": 1280, "height": 720, "scrollX": 0, "scrollY": 0})
}

#[tokio::test(start_paused = true)]
async fn test_recorded_session_replays_cleanly() {
    let dir = TempDir::new().unwrap();
    let page = page();
    let recorder = Recorder::new(page.clone(), RecorderOptions::default(), Arc::new(MemoryBackup::new()));
    recorder.start(URL, "shop").await.unwrap();
    let base = now_ms();

    page.emit_binding(
        BINDING_NAME,
        &json!({
            "kind": "click", "ts": base + 3_000, "x": 140, "y": 215, "viewport": viewport(),
            "element": {
                "tag": "button", "text": "Sign in", "id": "submit",
                "rect": {"x": 100, "y": 200, "width": 80, "height": 30},
                "path": [{"tag": "button", "id": "submit", "nth": 1}]
            }
        }),
    );
    for (i, text) in ["r", "ru", "rus", "rust"].iter().enumerate() {
        page.emit_binding(
            BINDING_NAME,
            &json!({
                "kind": "input", "ts": base + 6_000 + i as i64 * 120, "value": text, "viewport": viewport(),
                "element": {
                    "tag": "input", "name": "q", "placeholder": "Search",
                    "rect": {"x": 100, "y": 100, "width": 300, "height": 30},
                    "path": [{"tag": "input", "id": null, "nth": 1}, {"tag": "form", "id": "search", "nth": 1}]
                }
            }),
        );
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    let actions = recorder.stop().await.unwrap();
    let types: Vec<ActionType> = actions.iter().map(|a| a.action_type).collect();
    assert_eq!(types, vec![ActionType::Navigate, ActionType::Click, ActionType::Type]);

    // Persist and reload as a user would between sessions.
    let json = Workflow::new("login", "shop", actions).to_json().unwrap();
    let workflow = Workflow::from_json(&json).unwrap();

    let controller = ReplayController::new(page.clone(), replay_options(&dir));
    let report = controller.execute(&workflow, &Variables::new()).await;

    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(report.overall_stats.total, 3);
    assert_eq!(report.overall_stats.success_rate, 100.0);
    assert!(report.actions.iter().all(|a| a.retries == 0));
    assert_eq!(page.clicks(), vec![Point::new(140.0, 215.0)]);
    assert_eq!(page.typed().last().map(|(_, v)| v.as_str()), Some("rust"));
    assert_eq!(page.navigations(), vec![URL.to_string(), URL.to_string()]);
}

#[tokio::test]
async fn test_vanished_target_fails_after_retries() {
    let dir = TempDir::new().unwrap();
    let page = page();
    let descriptor = VisualDescriptor {
        text: "Vanished button".into(),
        tag: Some("button".into()),
        position: Some(Position {
            absolute: Point::new(9999.0, 9999.0),
            relative: Point::new(9999.0, 9999.0),
        }),
        bounding_box: Some(BoundingBox::new(9999.0, 9999.0, 10.0, 10.0)),
        timestamp: Some(1),
        ..Default::default()
    };
    let workflow = Workflow::new(
        "broken",
        "shop",
        vec![Action::click("Click \"Vanished button\"", Some(descriptor), Some("##bad".into()))],
    );

    let controller = ReplayController::new(page.clone(), replay_options(&dir));
    let report = controller.execute(&workflow, &Variables::new()).await;

    assert!(!report.is_success());
    let result = &report.actions[0];
    assert!(!result.success);
    assert_eq!(result.retries, 2);
    assert_eq!(result.method, ResolutionMethod::None);
    assert_eq!(report.errors[0].kind, ErrorKind::ResolutionFailure);
    assert!(report.errors[0].criteria.is_some());
    assert!(report.errors[0].screenshot.as_ref().is_some_and(|p| p.exists()));
    assert!(page.clicks().is_empty());
}
