//! Core session struct and CDP command dispatch.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;
use webtrail_protocols::PageEvent;

use super::events::{NetworkTracker, spawn_event_pump};
use crate::cdp::error::CdpError;
use crate::cdp::protocol::{CdpResponse, ClipRect, ScreenshotFormat, VisualViewport};
use crate::cdp::transport::Transport;

/// A session attached to a single page/target.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    pub(super) transport: Arc<Transport>,
    pub(super) events: broadcast::Sender<PageEvent>,
    pub(super) network: Arc<NetworkTracker>,
    pub(super) main_frame: Arc<Mutex<Option<String>>>,
    pump: tokio::task::JoinHandle<()>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Arc<Transport>,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        let (events, _) = broadcast::channel(1024);
        let network = Arc::new(NetworkTracker::default());
        let main_frame = Arc::new(Mutex::new(None));
        let pump = spawn_event_pump(
            event_rx,
            events.clone(),
            network.clone(),
            main_frame.clone(),
        );
        Self {
            target_id,
            session_id,
            transport,
            events,
            network,
            main_frame,
            pump,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Subscribe to translated page events.
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    /// Enable required CDP domains and remember the main frame id.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;

        let tree = self.call("Page.getFrameTree", None).await?;
        if let Some(id) = tree["frameTree"]["frame"]["id"].as_str() {
            *self.main_frame.lock() = Some(id.to_string());
        }

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Current CSS visual viewport.
    pub async fn layout_metrics(&self) -> Result<VisualViewport, CdpError> {
        let result = self.call("Page.getLayoutMetrics", None).await?;
        let viewport = result
            .get("cssVisualViewport")
            .or_else(|| result.get("visualViewport"))
            .cloned()
            .ok_or_else(|| CdpError::InvalidResponse("Missing visual viewport".to_string()))?;
        Ok(serde_json::from_value(viewport)?)
    }

    /// Pin the viewport size so recorded coordinates stay comparable.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 1,
                "mobile": false,
            })),
        )
        .await?;
        Ok(())
    }

    /// Take a screenshot, returned base64-encoded.
    pub async fn screenshot(
        &self,
        format: ScreenshotFormat,
        quality: Option<u8>,
        clip: Option<ClipRect>,
    ) -> Result<String, CdpError> {
        let mut params = json!({ "format": format });

        if let Some(q) = quality {
            params["quality"] = json!(q);
        }

        if let Some(c) = clip {
            params["clip"] = serde_json::to_value(c)?;
        }

        let result = self.call("Page.captureScreenshot", Some(params)).await?;

        result["data"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing screenshot data".to_string()))
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
