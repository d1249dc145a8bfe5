use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use webtrail_protocols::{BoundingBox, Point, Position};

use super::*;
use crate::sensitive::SensitiveField;

fn compiler() -> ActionCompiler {
    ActionCompiler::new(&CompilerConfig::default())
}

fn descriptor(text: &str, ts: i64) -> VisualDescriptor {
    VisualDescriptor {
        text: text.to_string(),
        tag: Some("input".into()),
        position: Some(Position {
            absolute: Point::new(640.0, 360.0),
            relative: Point::new(50.0, 50.0),
        }),
        bounding_box: Some(BoundingBox::new(600.0, 340.0, 80.0, 40.0)),
        timestamp: Some(ts),
        ..Default::default()
    }
}

fn click(text: &str, selector: &str, ts: i64) -> RawEvent {
    RawEvent::new(RawEventKind::Click, ts).with_target(Some(descriptor(text, ts)), Some(selector.into()))
}

fn typing(selector: &str, value: &str, ts: i64) -> RawEvent {
    RawEvent::new(RawEventKind::Type, ts)
        .with_target(Some(descriptor("", ts)), Some(selector.into()))
        .with_value(value)
}

fn compile(events: &[RawEvent]) -> Vec<Action> {
    compiler().compile_with_rng(events, &mut StdRng::seed_from_u64(7))
}

fn types(actions: &[Action]) -> Vec<ActionType> {
    actions.iter().map(|a| a.action_type).collect()
}

#[test]
fn test_spaced_events_get_no_waits() {
    let actions = compile(&[
        RawEvent::navigate("https://example.com", 0),
        click("Sign in", "#go", 3_000),
        typing("#q", "rust", 6_000),
    ]);
    assert_eq!(types(&actions), vec![ActionType::Navigate, ActionType::Click, ActionType::Type]);
    assert_eq!(actions[1].name, "Click \"Sign in\"");
}

#[test]
fn test_close_events_get_one_wait() {
    let actions = compile(&[click("A", "#a", 0), click("B", "#b", 500), click("C", "#c", 900)]);
    assert_eq!(
        types(&actions),
        vec![
            ActionType::Click,
            ActionType::Wait,
            ActionType::Click,
            ActionType::Wait,
            ActionType::Click,
        ]
    );
    for wait in actions.iter().filter(|a| a.action_type == ActionType::Wait) {
        let ms = wait.wait_duration().unwrap().as_millis();
        assert!((1_000..=2_000).contains(&ms), "wait {}ms out of range", ms);
    }
}

#[test]
fn test_seeded_waits_are_reproducible() {
    let events = [click("A", "#a", 0), click("B", "#b", 100)];
    let first = compiler().compile_with_rng(&events, &mut StdRng::seed_from_u64(1));
    let second = compiler().compile_with_rng(&events, &mut StdRng::seed_from_u64(1));
    assert_eq!(first, second);
}

#[test]
fn test_consecutive_typing_merges_to_latest_value() {
    let actions = compile(&[
        typing("#q", "r", 0),
        typing("#q", "ru", 2_500),
        typing("#q", "rust", 5_000),
        typing("#other", "x", 8_000),
    ]);
    assert_eq!(types(&actions), vec![ActionType::Type, ActionType::Type]);
    assert_eq!(actions[0].value.as_deref(), Some("rust"));
    assert_eq!(actions[1].value.as_deref(), Some("x"));
}

#[test]
fn test_wait_gap_measured_from_last_keystroke() {
    let actions = compile(&[
        typing("#q", "r", 0),
        typing("#q", "rust", 5_000),
        click("Go", "#go", 6_000),
    ]);
    assert_eq!(types(&actions), vec![ActionType::Type, ActionType::Wait, ActionType::Click]);
    assert_eq!(actions[0].value.as_deref(), Some("rust"));
}

#[test]
fn test_typing_split_by_click_is_not_merged() {
    let actions = compile(&[typing("#q", "a", 0), click("Go", "#go", 3_000), typing("#q", "b", 6_000)]);
    assert_eq!(types(&actions), vec![ActionType::Type, ActionType::Click, ActionType::Type]);
}

#[test]
fn test_invalid_descriptor_downgrades_to_selector_first() {
    let mut event = click("A", "#a", 0);
    if let Some(visual) = event.visual.as_mut() {
        visual.position = None;
    }
    let compiler = ActionCompiler::new(&CompilerConfig {
        default_resolution_mode: "visualFirst".into(),
        ..Default::default()
    });
    let actions = compiler.compile(&[event]);
    assert_eq!(actions.len(), 1);
    assert!(actions[0].visual.is_none());
    assert_eq!(actions[0].backup_selector.as_deref(), Some("#a"));
    assert_eq!(actions[0].resolution_mode, ResolutionMode::SelectorFirst);
}

#[test]
fn test_invalid_descriptor_without_selector_is_dropped() {
    let mut event = RawEvent::new(RawEventKind::Click, 0).with_target(Some(descriptor("A", 0)), None);
    if let Some(visual) = event.visual.as_mut() {
        visual.bounding_box = None;
    }
    assert!(compile(&[event]).is_empty());
}

#[test]
fn test_screenshot_less_descriptor_is_kept() {
    let actions = compile(&[RawEvent::new(RawEventKind::Click, 0).with_target(Some(descriptor("A", 0)), None)]);
    assert_eq!(actions.len(), 1);
    assert!(actions[0].visual.is_some());
    assert_eq!(actions[0].resolution_mode, ResolutionMode::SelectorFirst);
}

#[test]
fn test_default_mode_applies_to_valid_descriptors() {
    let compiler = ActionCompiler::new(&CompilerConfig {
        default_resolution_mode: "visualOnly".into(),
        ..Default::default()
    });
    let actions = compiler.compile(&[click("A", "#a", 0)]);
    assert_eq!(actions[0].resolution_mode, ResolutionMode::VisualOnly);
}

#[test]
fn test_sensitive_values_become_placeholders() {
    let event = typing("#pw", "hunter2", 0).masked(SensitiveField::Password);
    let actions = compile(&[event]);
    assert_eq!(actions[0].value.as_deref(), Some("{{password}}"));
    let json = serde_json::to_string(&actions).unwrap();
    assert!(!json.contains("hunter2"));
}

#[test]
fn test_scroll_and_upload() {
    let scroll = RawEvent::new(RawEventKind::Scroll, 0).with_params(json!({"x": 0.0, "y": 800.0}));
    let upload = RawEvent::new(RawEventKind::Upload, 3_000)
        .with_target(Some(descriptor("", 3_000)), Some("input[name=\"file\"]".into()))
        .with_params(json!({"files": ["photo.jpg"]}));
    let actions = compile(&[scroll, upload]);
    assert_eq!(types(&actions), vec![ActionType::Scroll, ActionType::Upload]);
    assert_eq!(actions[0].scroll_target(), Some((0.0, 800.0)));
    assert_eq!(actions[1].files(), vec!["photo.jpg".to_string()]);
}

#[test]
fn test_empty_navigation_is_dropped() {
    assert!(compile(&[RawEvent::navigate("", 0)]).is_empty());
}
