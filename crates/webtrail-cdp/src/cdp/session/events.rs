//! Page event pump and network activity tracking.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;
use webtrail_protocols::PageEvent;

use super::core::PageSession;
use crate::cdp::error::CdpError;
use crate::cdp::protocol::CdpResponse;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct NetworkState {
    inflight: HashSet<String>,
    last_change: Instant,
}

/// In-flight request bookkeeping for network-idle waits.
pub(crate) struct NetworkTracker {
    state: Mutex<NetworkState>,
}

impl Default for NetworkTracker {
    fn default() -> Self {
        Self {
            state: Mutex::new(NetworkState {
                inflight: HashSet::new(),
                last_change: Instant::now(),
            }),
        }
    }
}

impl NetworkTracker {
    pub(crate) fn started(&self, request_id: &str) {
        let mut state = self.state.lock();
        state.inflight.insert(request_id.to_string());
        state.last_change = Instant::now();
    }

    pub(crate) fn finished(&self, request_id: &str) {
        let mut state = self.state.lock();
        if state.inflight.remove(request_id) {
            state.last_change = Instant::now();
        }
    }

    /// Forget requests of the previous document.
    pub(crate) fn reset(&self) {
        let mut state = self.state.lock();
        state.inflight.clear();
        state.last_change = Instant::now();
    }

    /// Time since the network went quiet, `None` while requests are in flight.
    pub(crate) fn idle_for(&self) -> Option<Duration> {
        let state = self.state.lock();
        state
            .inflight
            .is_empty()
            .then(|| state.last_change.elapsed())
    }

    pub(crate) fn inflight(&self) -> usize {
        self.state.lock().inflight.len()
    }
}

/// Translate a raw CDP event into a [`PageEvent`].
///
/// Sub-frame navigations are ignored; `main_frame` is the top-level frame id
/// when known.
pub(crate) fn translate_event(
    method: &str,
    params: &Value,
    main_frame: Option<&str>,
) -> Option<PageEvent> {
    let is_main = |frame_id: Option<&str>| match (frame_id, main_frame) {
        (Some(id), Some(main)) => id == main,
        _ => true,
    };
    match method {
        "Runtime.bindingCalled" => Some(PageEvent::BindingCalled {
            name: params["name"].as_str()?.to_string(),
            payload: params["payload"].as_str().unwrap_or_default().to_string(),
        }),
        "Page.frameNavigated" => {
            let frame = &params["frame"];
            if frame.get("parentId").is_some_and(|p| !p.is_null()) {
                return None;
            }
            Some(PageEvent::Navigated {
                url: frame["url"].as_str()?.to_string(),
                same_document: false,
            })
        }
        "Page.navigatedWithinDocument" => {
            if !is_main(params["frameId"].as_str()) {
                return None;
            }
            Some(PageEvent::Navigated {
                url: params["url"].as_str()?.to_string(),
                same_document: true,
            })
        }
        "Page.loadEventFired" => Some(PageEvent::Loaded),
        "Inspector.detached" | "Target.detachedFromTarget" => Some(PageEvent::Closed),
        _ => None,
    }
}

/// Forward session events to subscribers until the session's route closes.
pub(crate) fn spawn_event_pump(
    mut event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    events: broadcast::Sender<PageEvent>,
    network: Arc<NetworkTracker>,
    main_frame: Arc<Mutex<Option<String>>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = event_rx.recv().await {
            let Some(method) = message.method.as_deref() else {
                continue;
            };
            let params = message.params.unwrap_or(Value::Null);
            trace!("CDP event: {}", method);

            match method {
                "Network.requestWillBeSent" => {
                    if let Some(id) = params["requestId"].as_str() {
                        network.started(id);
                    }
                    continue;
                }
                "Network.loadingFinished" | "Network.loadingFailed" => {
                    if let Some(id) = params["requestId"].as_str() {
                        network.finished(id);
                    }
                    continue;
                }
                "Page.frameNavigated" if params["frame"].get("parentId").is_none() => {
                    if let Some(id) = params["frame"]["id"].as_str() {
                        *main_frame.lock() = Some(id.to_string());
                    }
                    // Requests of the previous document never report completion.
                    network.reset();
                }
                _ => {}
            }

            let main = main_frame.lock().clone();
            if let Some(event) = translate_event(method, &params, main.as_deref()) {
                let _ = events.send(event);
            }
        }
        let _ = events.send(PageEvent::Closed);
    })
}

impl PageSession {
    /// Wait until no request has been in flight for `idle`.
    pub async fn wait_for_network_idle(
        &self,
        idle: Duration,
        timeout: Duration,
    ) -> Result<(), CdpError> {
        let start = Instant::now();
        loop {
            if self.network.idle_for().is_some_and(|quiet| quiet >= idle) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!(
                    "Network still busy ({} requests in flight)",
                    self.network.inflight()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
