//! [`BrowserDriver`] over a CDP page session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use webtrail_protocols::{
    BoundingBox, BrowserDriver, DriverError, ElementHandle, ElementSnapshot, PageEvent, Viewport,
};

use crate::cdp::{ClipRect, PageSession, ScreenshotFormat};
use crate::scripts;

const DOM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// `Page.addScriptToEvaluateOnNewDocument` identifiers by binding name.
#[derive(Default)]
struct InitScripts(Mutex<HashMap<String, String>>);

impl InitScripts {
    fn identifier(&self, binding: &str) -> Option<String> {
        self.0.lock().get(binding).cloned()
    }

    fn record(&self, binding: &str, identifier: String) {
        self.0.lock().insert(binding.to_string(), identifier);
    }
}

/// Browser driver backed by a live Chrome tab.
pub struct CdpDriver {
    session: Arc<PageSession>,
    init_scripts: InitScripts,
}

impl CdpDriver {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self {
            session,
            init_scripts: InitScripts::default(),
        }
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    async fn eval(&self, expression: &str) -> Result<Value, DriverError> {
        Ok(self.session.evaluate(expression).await?)
    }

    fn parse_snapshots(value: Value) -> Result<Vec<ElementSnapshot>, DriverError> {
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value)
            .map_err(|e| DriverError::Script(format!("malformed element list: {}", e)))
    }

    async fn object_id(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let remote = self
            .session
            .evaluate_handle(&scripts::element(element.as_str()))
            .await?;
        remote
            .object_id
            .ok_or_else(|| DriverError::ElementNotFound(element.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.session.navigate(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.session.get_url().await?)
    }

    async fn viewport(&self) -> Result<Viewport, DriverError> {
        let metrics = self.session.layout_metrics().await?;
        Ok(Viewport {
            width: metrics.client_width,
            height: metrics.client_height,
            scroll_x: metrics.page_x,
            scroll_y: metrics.page_y,
        })
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>, DriverError> {
        let value = self.eval(&scripts::query_all(selector)).await?;
        if let Some(message) = value.get("invalidSelector").and_then(Value::as_str) {
            return Err(DriverError::InvalidSelector(format!("{}: {}", selector, message)));
        }
        let found = Self::parse_snapshots(value)?;
        trace!("Selector {} matched {} elements", selector, found.len());
        Ok(found)
    }

    async fn scan_elements(&self) -> Result<Vec<ElementSnapshot>, DriverError> {
        let found = Self::parse_snapshots(self.eval(&scripts::scan()).await?)?;
        debug!("Scanned {} candidate elements", found.len());
        Ok(found)
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<BoundingBox>, DriverError> {
        let value = self.eval(&scripts::rect(element.as_str())).await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DriverError::Script(format!("malformed rect: {}", e)))
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError> {
        Ok(self.session.click(x, y).await?)
    }

    async fn type_into(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let found = self.eval(&scripts::focus_and_clear(element.as_str())).await?;
        if found != Value::Bool(true) {
            return Err(DriverError::ElementNotFound(element.to_string()));
        }
        self.session.insert_text(text).await?;
        self.eval(&scripts::commit_value(element.as_str())).await?;
        Ok(())
    }

    async fn read_value(&self, element: &ElementHandle) -> Result<Option<String>, DriverError> {
        let value = self.eval(&scripts::read_value(element.as_str())).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn scroll_to(&self, x: f64, y: f64) -> Result<(), DriverError> {
        self.eval(&scripts::scroll_to(x, y)).await?;
        Ok(())
    }

    async fn set_files(&self, element: &ElementHandle, paths: &[String]) -> Result<(), DriverError> {
        let object_id = self.object_id(element).await?;
        let result = self.session.set_file_input_files(&object_id, paths).await;
        let _ = self.session.release_object(&object_id).await;
        Ok(result?)
    }

    async fn screenshot(&self, clip: Option<BoundingBox>) -> Result<Vec<u8>, DriverError> {
        let clip = match clip {
            Some(rect) => {
                // Clip rectangles are in document coordinates.
                let metrics = self.session.layout_metrics().await?;
                Some(ClipRect {
                    x: rect.x + metrics.page_x,
                    y: rect.y + metrics.page_y,
                    width: rect.width,
                    height: rect.height,
                    scale: 1.0,
                })
            }
            None => None,
        };
        let data = self
            .session
            .screenshot(ScreenshotFormat::Png, None, clip)
            .await
            .map_err(|e| DriverError::ScreenshotFailed(e.to_string()))?;
        BASE64
            .decode(data)
            .map_err(|e| DriverError::ScreenshotFailed(e.to_string()))
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, DriverError> {
        self.eval(expression).await
    }

    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration) -> Result<(), DriverError> {
        Ok(self.session.wait_for_network_idle(idle, timeout).await?)
    }

    async fn wait_for_dom_quiet(&self, idle: Duration, timeout: Duration) -> Result<(), DriverError> {
        let start = Instant::now();
        loop {
            let quiet_ms = self
                .eval(scripts::DOM_QUIET_SCRIPT)
                .await
                .ok()
                .and_then(|v| v.as_f64());
            if quiet_ms.is_some_and(|ms| ms >= idle.as_millis() as f64) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(DriverError::Timeout("DOM did not settle".to_string()));
            }
            tokio::time::sleep(DOM_POLL_INTERVAL).await;
        }
    }

    /// The binding and init script survive navigations, so they are
    /// registered once; re-arming only evaluates the script in the current document.
    async fn install_capture(&self, binding: &str, script: &str) -> Result<(), DriverError> {
        if let Some(identifier) = self.init_scripts.identifier(binding) {
            trace!("Capture init script {} already registered", identifier);
        } else {
            self.session.add_binding(binding).await?;
            let identifier = self.session.add_init_script(script).await?;
            self.init_scripts.record(binding, identifier);
        }
        self.eval(script).await?;
        debug!("Capture script installed with binding {}", binding);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_scripts_registered_once_per_binding() {
        let scripts = InitScripts::default();
        assert_eq!(scripts.identifier("__webtrailEmit"), None);

        scripts.record("__webtrailEmit", "1".to_string());
        assert_eq!(scripts.identifier("__webtrailEmit").as_deref(), Some("1"));
        assert_eq!(scripts.identifier("__other"), None);
    }
}
