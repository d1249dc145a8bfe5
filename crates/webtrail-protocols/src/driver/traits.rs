//! The [`BrowserDriver`] trait.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::element::{ElementHandle, ElementSnapshot};
use super::event::PageEvent;
use crate::error::DriverError;
use crate::types::{BoundingBox, Viewport};

/// Outline drawn around a rectangle. Receives `x, y, width, height` as `%X%`-style tokens.
pub const HIGHLIGHT_SCRIPT: &str = r#"(() => {
    const old = document.getElementById('__webtrail_highlight');
    if (old) old.remove();
    const box = document.createElement('div');
    box.id = '__webtrail_highlight';
    Object.assign(box.style, {
        position: 'fixed', left: '%X%px', top: '%Y%px',
        width: '%W%px', height: '%H%px',
        outline: '3px solid #ff2d55', background: 'rgba(255,45,85,0.12)',
        zIndex: 2147483647, pointerEvents: 'none'
    });
    document.documentElement.appendChild(box);
    setTimeout(() => box.remove(), 1500);
    return true;
})()"#;

/// Capability interface over a single page/tab.
///
/// Each workflow run owns its own driver; implementations need not support
/// concurrent mutation from several controllers.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate the page and wait for the document to load.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn viewport(&self) -> Result<Viewport, DriverError>;

    /// All elements matching a CSS selector.
    ///
    /// A syntactically invalid selector yields [`DriverError::InvalidSelector`].
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>, DriverError>;

    /// Visible, interactive or text-bearing elements considered by descriptor matching.
    async fn scan_elements(&self) -> Result<Vec<ElementSnapshot>, DriverError>;

    /// Current bounding rectangle, `None` when the element is detached or has no layout.
    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<BoundingBox>, DriverError>;

    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError>;

    /// Focus the element, clear it and type `text`.
    async fn type_into(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Current `value` (inputs) or text content of the element.
    async fn read_value(&self, element: &ElementHandle) -> Result<Option<String>, DriverError>;

    /// Scroll the window to an absolute document position.
    async fn scroll_to(&self, x: f64, y: f64) -> Result<(), DriverError>;

    /// Attach local files to a file input.
    async fn set_files(&self, element: &ElementHandle, paths: &[String]) -> Result<(), DriverError>;

    /// PNG bytes of the viewport, or of `clip` when given.
    async fn screenshot(&self, clip: Option<BoundingBox>) -> Result<Vec<u8>, DriverError>;

    async fn evaluate(&self, expression: &str) -> Result<Value, DriverError>;

    /// Wait until no network request has been in flight for `idle`.
    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration) -> Result<(), DriverError>;

    /// Wait until the DOM has not mutated for `idle`.
    async fn wait_for_dom_quiet(&self, idle: Duration, timeout: Duration) -> Result<(), DriverError>;

    /// Register `binding` as a page-to-controller channel and run `script` in
    /// the current and every future document.
    async fn install_capture(&self, binding: &str, script: &str) -> Result<(), DriverError>;

    /// Subscribe to page events.
    fn subscribe(&self) -> broadcast::Receiver<PageEvent>;

    /// Page stability: network idle and DOM quiet, bounded by `timeout` overall.
    async fn wait_for_stability(&self, idle: Duration, timeout: Duration) -> Result<(), DriverError> {
        let started = std::time::Instant::now();
        self.wait_for_network_idle(idle, timeout).await?;
        let remaining = timeout.saturating_sub(started.elapsed());
        self.wait_for_dom_quiet(idle, remaining.max(idle)).await
    }

    /// Draw a transient outline around `rect` (debug aid).
    async fn highlight(&self, rect: &BoundingBox) -> Result<(), DriverError> {
        let script = HIGHLIGHT_SCRIPT
            .replace("%X%", &format!("{:.1}", rect.x))
            .replace("%Y%", &format!("{:.1}", rect.y))
            .replace("%W%", &format!("{:.1}", rect.width))
            .replace("%H%", &format!("{:.1}", rect.height));
        self.evaluate(&script).await.map(|_| ())
    }
}
