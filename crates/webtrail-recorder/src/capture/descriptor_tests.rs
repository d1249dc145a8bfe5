use super::*;
use webtrail_protocols::BoundingBox;

fn button() -> CapturedElement {
    CapturedElement {
        tag: "button".into(),
        text: "  Sign   in ".into(),
        aria_label: Some("Sign in to your account".into()),
        rect: BoundingBox::new(600.0, 340.0, 80.0, 40.0),
        parent_text: "Welcome back Sign in".into(),
        prev_text: "Forgot password?".into(),
        next_text: "Create account".into(),
        ..Default::default()
    }
}

#[test]
fn test_position_is_absolute_and_relative() {
    let viewport = Viewport::new(1280.0, 720.0);
    let d = capture_descriptor(&button(), Some(Point::new(640.0, 360.0)), &viewport, 42).unwrap();
    let position = d.position.unwrap();
    assert_eq!(position.absolute, Point::new(640.0, 360.0));
    assert_eq!(position.relative, Point::new(50.0, 50.0));
    assert_eq!(d.bounding_box, Some(BoundingBox::new(600.0, 340.0, 80.0, 40.0)));
    assert_eq!(d.timestamp, Some(42));
    assert!(d.validate());
}

#[test]
fn test_without_pointer_uses_center() {
    let viewport = Viewport::new(1280.0, 720.0);
    let d = capture_descriptor(&button(), None, &viewport, 1).unwrap();
    assert_eq!(d.position.unwrap().absolute, Point::new(640.0, 360.0));
}

#[test]
fn test_pointer_outside_element_is_ignored() {
    let viewport = Viewport::new(1280.0, 720.0);
    let d = capture_descriptor(&button(), Some(Point::new(5.0, 5.0)), &viewport, 1).unwrap();
    assert_eq!(d.position.unwrap().absolute, Point::new(640.0, 360.0));
}

#[test]
fn test_text_is_collapsed() {
    let d = capture_descriptor(&button(), None, &Viewport::default(), 1).unwrap();
    assert_eq!(d.text, "Sign in");
    assert_eq!(d.tag.as_deref(), Some("button"));
}

#[test]
fn test_surrounding_text_is_bounded_and_distinct() {
    let mut el = button();
    el.placeholder = Some("Forgot password?".into());
    let d = capture_descriptor(&el, None, &Viewport::default(), 1).unwrap();
    assert_eq!(
        d.surrounding_text,
        vec![
            "Welcome back Sign in".to_string(),
            "Forgot password?".to_string(),
            "Create account".to_string(),
            "Sign in to your account".to_string(),
        ]
    );
    assert!(d.surrounding_text.len() <= MAX_SURROUNDING_TEXT);
}

#[test]
fn test_surrounding_text_skips_own_text() {
    let mut el = button();
    el.parent_text = "Sign in".into();
    let d = capture_descriptor(&el, None, &Viewport::default(), 1).unwrap();
    assert!(!d.surrounding_text.contains(&"Sign in".to_string()));
}

#[test]
fn test_zero_size_element_fails() {
    let mut el = button();
    el.rect = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
    let err = capture_descriptor(&el, None, &Viewport::default(), 1).unwrap_err();
    assert!(matches!(err, RecorderError::CaptureFailure(_)));
}

#[test]
fn test_unusable_viewport_fails() {
    let err = capture_descriptor(&button(), None, &Viewport::new(0.0, 720.0), 1).unwrap_err();
    assert!(matches!(err, RecorderError::CaptureFailure(_)));
}

#[test]
fn test_no_screenshot_still_validates() {
    let d = capture_descriptor(&button(), None, &Viewport::default(), 1).unwrap();
    assert!(d.screenshot.is_none());
    assert!(d.validate());
}
