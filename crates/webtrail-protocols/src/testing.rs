//! In-memory [`BrowserDriver`] for tests.
//!
//! [`StaticPage`] holds a fixed element list and records every interaction,
//! so recorder and replay logic can be exercised without a browser.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::driver::{BrowserDriver, ElementHandle, ElementSnapshot, PageEvent};
use crate::error::DriverError;
use crate::types::{BoundingBox, Point, Viewport};

/// Minimal PNG signature returned as screenshot bytes.
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Default)]
struct PageState {
    url: String,
    viewport: Viewport,
    elements: Vec<ElementSnapshot>,
    selectors: HashMap<String, Vec<ElementHandle>>,
    values: HashMap<ElementHandle, String>,
    clicks: Vec<Point>,
    typed: Vec<(ElementHandle, String)>,
    navigations: Vec<String>,
    scrolls: Vec<Point>,
    uploads: Vec<(ElementHandle, Vec<String>)>,
    scripts: Vec<String>,
    highlights: usize,
    fail_screenshots: bool,
    fail_injections: u32,
    fail_typing: bool,
    stall_network: bool,
}

/// A scripted page with no browser behind it.
pub struct StaticPage {
    state: Mutex<PageState>,
    events: broadcast::Sender<PageEvent>,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, viewport: Viewport) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: Mutex::new(PageState {
                url: url.into(),
                viewport,
                ..Default::default()
            }),
            events,
        }
    }

    pub fn with_element(self, element: ElementSnapshot) -> Self {
        self.add_element(element);
        self
    }

    pub fn add_element(&self, element: ElementSnapshot) {
        self.state.lock().elements.push(element);
    }

    pub fn remove_element(&self, handle: &str) {
        let mut state = self.state.lock();
        state.elements.retain(|e| e.handle.as_str() != handle);
        for handles in state.selectors.values_mut() {
            handles.retain(|h| h.as_str() != handle);
        }
    }

    /// Make `selector` resolve to exactly `handles`, bypassing the built-in matcher.
    pub fn register_selector(&self, selector: impl Into<String>, handles: &[&str]) {
        self.state.lock().selectors.insert(
            selector.into(),
            handles.iter().map(|h| ElementHandle::new(*h)).collect(),
        );
    }

    pub fn set_value(&self, handle: &str, value: impl Into<String>) {
        self.state
            .lock()
            .values
            .insert(ElementHandle::new(handle), value.into());
    }

    pub fn fail_screenshots(&self, fail: bool) {
        self.state.lock().fail_screenshots = fail;
    }

    /// Make the next `count` capture installations fail.
    pub fn fail_injections(&self, count: u32) {
        self.state.lock().fail_injections = count;
    }

    /// Make typing succeed without updating the element's value.
    pub fn fail_typing(&self, fail: bool) {
        self.state.lock().fail_typing = fail;
    }

    /// Make network-idle waits hang until cleared.
    pub fn stall_network(&self, stall: bool) {
        self.state.lock().stall_network = stall;
    }

    /// Push an event to every subscriber.
    pub fn push_event(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }

    /// Simulate the capture script emitting `payload` through `binding`.
    pub fn emit_binding(&self, binding: &str, payload: &Value) {
        self.push_event(PageEvent::BindingCalled {
            name: binding.to_string(),
            payload: payload.to_string(),
        });
    }

    pub fn clicks(&self) -> Vec<Point> {
        self.state.lock().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(ElementHandle, String)> {
        self.state.lock().typed.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn scrolls(&self) -> Vec<Point> {
        self.state.lock().scrolls.clone()
    }

    pub fn uploads(&self) -> Vec<(ElementHandle, Vec<String>)> {
        self.state.lock().uploads.clone()
    }

    pub fn installed_scripts(&self) -> usize {
        self.state.lock().scripts.len()
    }

    pub fn highlights(&self) -> usize {
        self.state.lock().highlights
    }

    fn find(&self, handle: &ElementHandle) -> Option<ElementSnapshot> {
        self.state
            .lock()
            .elements
            .iter()
            .find(|e| &e.handle == handle)
            .cloned()
    }
}

#[async_trait]
impl BrowserDriver for StaticPage {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        if url.is_empty() {
            return Err(DriverError::NavigationFailed("empty url".to_string()));
        }
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().url.clone())
    }

    async fn viewport(&self) -> Result<Viewport, DriverError> {
        Ok(self.state.lock().viewport)
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>, DriverError> {
        let state = self.state.lock();
        if let Some(handles) = state.selectors.get(selector) {
            return Ok(handles
                .iter()
                .filter_map(|h| state.elements.iter().find(|e| &e.handle == h).cloned())
                .collect());
        }
        let matcher = SimpleSelector::parse(selector)?;
        Ok(state
            .elements
            .iter()
            .filter(|e| matcher.as_ref().is_some_and(|m| m.matches(e)))
            .cloned()
            .collect())
    }

    async fn scan_elements(&self) -> Result<Vec<ElementSnapshot>, DriverError> {
        Ok(self
            .state
            .lock()
            .elements
            .iter()
            .filter(|e| e.visible)
            .cloned()
            .collect())
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<BoundingBox>, DriverError> {
        Ok(self.find(element).map(|e| e.rect).filter(|r| r.has_layout()))
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError> {
        self.state.lock().clicks.push(Point::new(x, y));
        Ok(())
    }

    async fn type_into(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        if self.find(element).is_none() {
            return Err(DriverError::ElementNotFound(element.to_string()));
        }
        let mut state = self.state.lock();
        state.typed.push((element.clone(), text.to_string()));
        if !state.fail_typing {
            state.values.insert(element.clone(), text.to_string());
        }
        Ok(())
    }

    async fn read_value(&self, element: &ElementHandle) -> Result<Option<String>, DriverError> {
        Ok(self.state.lock().values.get(element).cloned())
    }

    async fn scroll_to(&self, x: f64, y: f64) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.viewport.scroll_x = x;
        state.viewport.scroll_y = y;
        state.scrolls.push(Point::new(x, y));
        Ok(())
    }

    async fn set_files(&self, element: &ElementHandle, paths: &[String]) -> Result<(), DriverError> {
        if self.find(element).is_none() {
            return Err(DriverError::ElementNotFound(element.to_string()));
        }
        self.state
            .lock()
            .uploads
            .push((element.clone(), paths.to_vec()));
        Ok(())
    }

    async fn screenshot(&self, _clip: Option<BoundingBox>) -> Result<Vec<u8>, DriverError> {
        if self.state.lock().fail_screenshots {
            return Err(DriverError::ScreenshotFailed("disabled".to_string()));
        }
        Ok(FAKE_PNG.to_vec())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, DriverError> {
        let mut state = self.state.lock();
        if expression.contains("__webtrail_highlight") {
            state.highlights += 1;
        }
        Ok(Value::Bool(true))
    }

    async fn wait_for_network_idle(&self, _idle: Duration, _timeout: Duration) -> Result<(), DriverError> {
        loop {
            if !self.state.lock().stall_network {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    async fn wait_for_dom_quiet(&self, _idle: Duration, _timeout: Duration) -> Result<(), DriverError> {
        Ok(())
    }

    async fn install_capture(&self, _binding: &str, script: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.fail_injections > 0 {
            state.fail_injections -= 1;
            return Err(DriverError::Script("capture script rejected".to_string()));
        }
        state.scripts.push(script.to_string());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }
}

/// The subset of CSS understood by [`StaticPage`]:
/// `tag`, `#id`, `.class`, `[attr="v"]` and their compounds.
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
}

impl SimpleSelector {
    /// `Ok(None)` for syntactically valid selectors outside the supported subset.
    fn parse(selector: &str) -> Result<Option<Self>, DriverError> {
        let selector = selector.trim();
        let invalid = || DriverError::InvalidSelector(selector.to_string());
        if selector.is_empty()
            || selector.contains("##")
            || selector.matches('[').count() != selector.matches(']').count()
        {
            return Err(invalid());
        }
        if selector.contains([' ', '>', '+', '~', ':', ',']) {
            return Ok(None);
        }

        let mut parsed = SimpleSelector {
            tag: None,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        };
        let mut rest = selector;
        let tag_end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
        if tag_end > 0 {
            parsed.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(first) = rest.chars().next() {
            match first {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = body.find(['#', '.', '[']).unwrap_or(body.len());
                    if end == 0 {
                        return Err(invalid());
                    }
                    let name = body[..end].to_string();
                    if first == '#' {
                        parsed.id = Some(name);
                    } else {
                        parsed.classes.push(name);
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest.find(']').ok_or_else(invalid)?;
                    let inner = &rest[1..close];
                    let (name, value) = inner.split_once('=').ok_or_else(invalid)?;
                    let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                    parsed.attrs.push((name.trim().to_string(), value.to_string()));
                    rest = &rest[close + 1..];
                }
                _ => return Err(invalid()),
            }
        }
        Ok(Some(parsed))
    }

    fn matches(&self, element: &ElementSnapshot) -> bool {
        let attrs = &element.attributes;
        if self.tag.as_deref().is_some_and(|t| t != element.tag) {
            return false;
        }
        if self.id.is_some() && self.id != attrs.id {
            return false;
        }
        if !self.classes.iter().all(|c| attrs.classes.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| {
            let actual = match name.as_str() {
                "id" => attrs.id.as_deref(),
                "name" => attrs.name.as_deref(),
                "placeholder" => attrs.placeholder.as_deref(),
                "type" => attrs.input_type.as_deref(),
                "aria-label" => attrs.aria_label.as_deref(),
                "data-testid" => attrs.test_id.as_deref(),
                "data-id" => attrs.data_id.as_deref(),
                "role" => attrs.role.as_deref(),
                _ => None,
            };
            actual == Some(value.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ElementAttributes;

    fn page() -> StaticPage {
        StaticPage::new("https://example.com/login", Viewport::new(1280.0, 720.0))
            .with_element(
                ElementSnapshot::new("e1", "input", BoundingBox::new(100.0, 100.0, 200.0, 30.0))
                    .with_attributes(ElementAttributes {
                        id: Some("email".into()),
                        name: Some("email".into()),
                        classes: vec!["field".into(), "wide".into()],
                        ..Default::default()
                    }),
            )
            .with_element(
                ElementSnapshot::new("e2", "button", BoundingBox::new(100.0, 200.0, 80.0, 30.0))
                    .with_text("Sign in")
                    .with_attributes(ElementAttributes {
                        classes: vec!["field".into()],
                        ..Default::default()
                    }),
            )
    }

    #[tokio::test]
    async fn test_simple_selectors() {
        let page = page();
        assert_eq!(page.query_selector_all("#email").await.unwrap().len(), 1);
        assert_eq!(page.query_selector_all("input[name=\"email\"]").await.unwrap().len(), 1);
        assert_eq!(page.query_selector_all(".field").await.unwrap().len(), 2);
        assert_eq!(page.query_selector_all("input.field.wide").await.unwrap().len(), 1);
        assert!(page.query_selector_all("#missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let page = page();
        let err = page.query_selector_all("##bad").await.unwrap_err();
        assert!(matches!(err, DriverError::InvalidSelector(_)));
    }

    #[tokio::test]
    async fn test_registered_selector_wins() {
        let page = page();
        page.register_selector("form > button:nth-child(2)", &["e2"]);
        let found = page.query_selector_all("form > button:nth-child(2)").await.unwrap();
        assert_eq!(found[0].handle.as_str(), "e2");
    }

    #[tokio::test]
    async fn test_type_and_read_value() {
        let page = page();
        let handle = ElementHandle::new("e1");
        page.type_into(&handle, "user@example.com").await.unwrap();
        assert_eq!(
            page.read_value(&handle).await.unwrap().as_deref(),
            Some("user@example.com")
        );
    }

    #[tokio::test]
    async fn test_injection_failures_are_counted() {
        let page = page();
        page.fail_injections(1);
        assert!(page.install_capture("b", "script").await.is_err());
        assert!(page.install_capture("b", "script").await.is_ok());
        assert_eq!(page.installed_scripts(), 1);
    }

    #[tokio::test]
    async fn test_highlight_uses_default_impl() {
        let page = page();
        page.highlight(&BoundingBox::new(1.0, 2.0, 3.0, 4.0)).await.unwrap();
        assert_eq!(page.highlights(), 1);
    }
}
