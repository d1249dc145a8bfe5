use std::collections::HashMap;

use webtrail_protocols::testing::StaticPage;
use webtrail_protocols::{BoundingBox, ElementAttributes, ElementSnapshot, Viewport};

use super::*;
use crate::capture::PathStep;

struct FixedCounts(HashMap<String, usize>);

impl FixedCounts {
    fn new(entries: &[(&str, usize)]) -> Self {
        Self(entries.iter().map(|(s, n)| (s.to_string(), *n)).collect())
    }
}

#[async_trait]
impl LocatorIndex for FixedCounts {
    async fn count(&self, selector: &str) -> Result<usize, DriverError> {
        Ok(self.0.get(selector).copied().unwrap_or(0))
    }
}

fn email_input() -> CapturedElement {
    CapturedElement {
        tag: "input".into(),
        name: Some("email".into()),
        placeholder: Some("Email".into()),
        classes: vec!["field".into()],
        path: vec![
            PathStep { tag: "input".into(), id: None, nth: 1 },
            PathStep { tag: "form".into(), id: Some("login".into()), nth: 1 },
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_first_unique_candidate_wins() {
    let index = FixedCounts::new(&[
        ("input[name=\"email\"]", 2),
        ("input[placeholder=\"Email\"]", 1),
        ("input.field", 1),
    ]);
    let selector = synthesize(&email_input(), &index).await;
    assert_eq!(selector.as_deref(), Some("input[placeholder=\"Email\"]"));
}

#[tokio::test]
async fn test_falls_back_to_structural_path() {
    let index = FixedCounts::new(&[("input[name=\"email\"]", 3), ("input.field", 3)]);
    let selector = synthesize(&email_input(), &index).await;
    assert_eq!(selector.as_deref(), Some("#login > input:nth-child(1)"));
}

#[tokio::test]
async fn test_ambiguous_structural_path_is_dropped() {
    let index = FixedCounts::new(&[("#login > input:nth-child(1)", 2)]);
    assert!(synthesize(&email_input(), &index).await.is_none());
}

#[tokio::test]
async fn test_synthesis_is_idempotent() {
    let page = StaticPage::new("https://example.com", Viewport::default()).with_element(
        ElementSnapshot::new("e1", "input", BoundingBox::new(10.0, 10.0, 100.0, 20.0)).with_attributes(
            ElementAttributes {
                name: Some("email".into()),
                placeholder: Some("Email".into()),
                classes: vec!["field".into()],
                ..Default::default()
            },
        ),
    );
    let index = DriverIndex::new(&page);
    let first = synthesize(&email_input(), &index).await;
    let second = synthesize(&email_input(), &index).await;
    assert_eq!(first.as_deref(), Some("input[name=\"email\"]"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_live_page_rejects_shared_attributes() {
    let rect = BoundingBox::new(10.0, 10.0, 100.0, 20.0);
    let attrs = ElementAttributes {
        name: Some("email".into()),
        ..Default::default()
    };
    let page = StaticPage::new("https://example.com", Viewport::default())
        .with_element(ElementSnapshot::new("e1", "input", rect).with_attributes(attrs.clone()))
        .with_element(ElementSnapshot::new("e2", "input", rect).with_attributes(attrs));
    page.register_selector("#login > input:nth-child(1)", &["e1"]);

    let el = CapturedElement {
        placeholder: None,
        classes: Vec::new(),
        ..email_input()
    };
    let selector = synthesize(&el, &DriverIndex::new(&page)).await;
    assert_eq!(selector.as_deref(), Some("#login > input:nth-child(1)"));
}
