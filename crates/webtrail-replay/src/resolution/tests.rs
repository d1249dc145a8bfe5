use super::*;
use webtrail_protocols::testing::StaticPage;
use webtrail_protocols::{
    BoundingBox, ElementAttributes, ElementSnapshot, ErrorKind, Point, Position, Viewport,
    VisualDescriptor,
};

fn viewport() -> Viewport {
    Viewport::new(1000.0, 1000.0)
}

fn descriptor(text: &str, tag: &str, rect: BoundingBox) -> VisualDescriptor {
    let vp = viewport();
    let center = rect.center();
    VisualDescriptor {
        text: text.to_string(),
        tag: Some(tag.to_string()),
        position: Some(Position {
            absolute: center,
            relative: vp.to_relative(center),
        }),
        bounding_box: Some(rect),
        timestamp: Some(1),
        ..Default::default()
    }
}

fn button(handle: &str, text: &str, rect: BoundingBox) -> ElementSnapshot {
    ElementSnapshot::new(handle, "button", rect).with_text(text)
}

fn strict() -> Thresholds {
    Thresholds {
        tolerance: 5.0,
        min_confidence: 0.8,
    }
}

#[test]
fn test_position_tolerance_zero_and_fifty() {
    let vp = viewport();
    // Centers at (50%, 50%) and (100%, 100%).
    let elements = vec![
        ElementSnapshot::new("a", "div", BoundingBox::new(490.0, 490.0, 20.0, 20.0)),
        ElementSnapshot::new("b", "div", BoundingBox::new(990.0, 990.0, 20.0, 20.0)),
    ];
    let recorded = Point::new(50.0, 50.0);

    let exact = position_matches(&elements, &vp, recorded, 0.0);
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].0.handle.as_str(), "a");

    let wide = position_matches(&elements, &vp, recorded, 50.0);
    let handles: Vec<_> = wide.iter().map(|(e, _)| e.handle.as_str()).collect();
    assert_eq!(handles, vec!["a", "b"]);
}

#[test]
fn test_position_prefers_smaller_container_at_equal_distance() {
    let vp = viewport();
    let elements = vec![
        ElementSnapshot::new("page", "div", BoundingBox::new(0.0, 0.0, 1000.0, 1000.0)),
        ElementSnapshot::new("btn", "button", BoundingBox::new(480.0, 480.0, 40.0, 40.0)),
    ];
    let matches = position_matches(&elements, &vp, Point::new(50.0, 50.0), 5.0);
    assert_eq!(matches[0].0.handle.as_str(), "btn");
    assert_eq!(matches[0].1, 0.0);
}

#[test]
fn test_selector_candidate_confidence() {
    let rect = BoundingBox::new(100.0, 100.0, 50.0, 20.0);
    let action = Action::click("Save", Some(descriptor("Save", "button", rect)), Some("button".into()));
    let criteria = SearchCriteria::new(&action, strict());

    let one = vec![button("a", "Save", rect)];
    assert_eq!(selector_candidate(&one, &criteria).unwrap().confidence, 1.0);

    let two = vec![
        button("far", "Save", BoundingBox::new(800.0, 800.0, 50.0, 20.0)),
        button("near", "Save", rect),
    ];
    let picked = selector_candidate(&two, &criteria).unwrap();
    assert_eq!(picked.element.handle.as_str(), "near");
    assert_eq!(picked.confidence, 0.75);

    let hidden = vec![ElementSnapshot::new("h", "button", BoundingBox::default())];
    assert!(selector_candidate(&hidden, &criteria).is_none());
}

#[test]
fn test_visual_score_is_perfect_for_unchanged_element() {
    let rect = BoundingBox::new(480.0, 480.0, 40.0, 40.0);
    let action = Action::click("Go", Some(descriptor("Go", "button", rect)), None);
    let criteria = SearchCriteria::new(&action, strict());
    let score = visual_score(&button("b", "Go", rect), &criteria, &viewport()).unwrap();
    assert!((score - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_selector_first_uses_unique_selector() {
    let rect = BoundingBox::new(100.0, 100.0, 80.0, 30.0);
    let page = StaticPage::new("https://example.com", viewport()).with_element(
        button("submit", "Sign in", rect).with_attributes(ElementAttributes {
            id: Some("submit".into()),
            ..Default::default()
        }),
    );
    let action = Action::click("Sign in", Some(descriptor("Sign in", "button", rect)), Some("#submit".into()));

    let found = ResolutionEngine::new().resolve(&page, &action, strict()).await.unwrap();
    assert_eq!(found.strategy, ResolutionMethod::Selector);
    assert_eq!(found.confidence, 1.0);
}

#[tokio::test]
async fn test_invalid_selector_falls_back_to_text() {
    let recorded = BoundingBox::new(100.0, 100.0, 80.0, 30.0);
    let moved = BoundingBox::new(600.0, 300.0, 80.0, 30.0);
    let page = StaticPage::new("https://example.com", viewport())
        .with_element(button("other", "Cancel", recorded))
        .with_element(button("target", "Sign in", moved));
    let action = Action::click("Sign in", Some(descriptor("Sign in", "button", recorded)), Some("##bad".into()));

    let found = ResolutionEngine::new().resolve(&page, &action, strict()).await.unwrap();
    assert_eq!(found.strategy, ResolutionMethod::Text);
    assert_eq!(found.element.handle.as_str(), "target");
}

#[tokio::test]
async fn test_equal_confidence_goes_to_earlier_strategy() {
    // Text and position both score 1.0; text is listed first in the tier.
    let rect = BoundingBox::new(480.0, 480.0, 40.0, 40.0);
    let page = StaticPage::new("https://example.com", viewport()).with_element(button("b", "Go", rect));
    let action = Action::click("Go", Some(descriptor("Go", "button", rect)), None);

    let found = ResolutionEngine::new().resolve(&page, &action, strict()).await.unwrap();
    assert_eq!(found.strategy, ResolutionMethod::Text);

    let visual_first = action.with_resolution_mode(ResolutionMode::VisualFirst);
    let found = ResolutionEngine::new().resolve(&page, &visual_first, strict()).await.unwrap();
    assert_eq!(found.strategy, ResolutionMethod::Visual);
}

#[tokio::test]
async fn test_visual_only_never_consults_selector() {
    let rect = BoundingBox::new(100.0, 100.0, 80.0, 30.0);
    let page = StaticPage::new("https://example.com", viewport()).with_element(
        button("b", "Save", rect).with_attributes(ElementAttributes {
            id: Some("save".into()),
            ..Default::default()
        }),
    );
    let action = Action::click("Save", Some(descriptor("Save", "button", rect)), Some("#save".into()))
        .with_resolution_mode(ResolutionMode::VisualOnly);

    let found = ResolutionEngine::new().resolve(&page, &action, strict()).await.unwrap();
    assert_ne!(found.strategy, ResolutionMethod::Selector);
}

#[tokio::test]
async fn test_failure_carries_criteria() {
    let page = StaticPage::new("https://example.com", viewport())
        .with_element(button("b", "Sign in", BoundingBox::new(100.0, 100.0, 80.0, 30.0)));
    let mut desc = descriptor("Vanished button", "button", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    desc.position = Some(Position {
        absolute: Point::new(9999.0, 9999.0),
        relative: Point::new(999.9, 999.9),
    });
    let action = Action::click("Vanished", Some(desc), Some("##bad".into()));

    let err = ResolutionEngine::new().resolve(&page, &action, strict()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    let criteria = err.criteria().unwrap();
    assert_eq!(criteria.selector.as_deref(), Some("##bad"));
    assert_eq!(criteria.thresholds, strict());
    let tried: Vec<_> = criteria.outcomes.iter().map(|o| o.strategy).collect();
    assert_eq!(
        tried,
        vec![
            ResolutionMethod::Selector,
            ResolutionMethod::Text,
            ResolutionMethod::Position,
            ResolutionMethod::Visual
        ]
    );
    assert!(criteria.outcomes[0].note.as_deref().unwrap().contains("Invalid selector"));
    assert!(criteria.to_json()["outcomes"].is_array());
}

#[tokio::test]
async fn test_selector_only_action_without_descriptor() {
    let rect = BoundingBox::new(10.0, 10.0, 50.0, 20.0);
    let page = StaticPage::new("https://example.com", viewport()).with_element(
        ElementSnapshot::new("q", "input", rect).with_attributes(ElementAttributes {
            name: Some("q".into()),
            ..Default::default()
        }),
    );
    let action = Action::type_text("Search", None, Some(r#"input[name="q"]"#.into()), "rust");

    let found = ResolutionEngine::new().resolve(&page, &action, strict()).await.unwrap();
    assert_eq!(found.element.handle.as_str(), "q");
}

#[test]
fn test_tiers_per_mode() {
    assert_eq!(strategy_tiers(ResolutionMode::SelectorFirst)[0], &[ResolutionMethod::Selector]);
    assert_eq!(strategy_tiers(ResolutionMode::VisualFirst).len(), 2);
    assert!(
        strategy_tiers(ResolutionMode::VisualOnly)
            .iter()
            .all(|tier| !tier.contains(&ResolutionMethod::Selector))
    );
}
