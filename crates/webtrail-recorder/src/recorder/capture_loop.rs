//! The capture loop: page events in, raw events appended to the log.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use webtrail_config::RecorderConfig;
use webtrail_protocols::{
    BoundingBox, BrowserDriver, PageEvent, Point, Viewport, VisualDescriptor,
};

use crate::capture::{
    BINDING_NAME, CAPTURE_SCRIPT, CaptureKind, CapturePayload, CapturedElement, capture_descriptor,
};
use crate::debounce::Debouncer;
use crate::error::RecorderError;
use crate::event::{RawEvent, RawEventKind};
use crate::navigation::{NavigationKind, classify_navigation};
use crate::selector::{self, DriverIndex};
use crate::sensitive::SensitiveField;

const ARM_RETRY_DELAY: Duration = Duration::from_millis(250);

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Install the capture script, trying up to `attempts` times.
pub(super) async fn arm(driver: &dyn BrowserDriver, attempts: u32) -> Result<(), RecorderError> {
    let mut last_error = String::from("no injection attempts configured");
    for attempt in 1..=attempts {
        match driver.install_capture(BINDING_NAME, CAPTURE_SCRIPT).await {
            Ok(()) => {
                debug!("Capture armed on attempt {}", attempt);
                return Ok(());
            }
            Err(e) => {
                warn!("Capture injection attempt {}/{} failed: {}", attempt, attempts, e);
                last_error = e.to_string();
                if attempt < attempts {
                    tokio::time::sleep(ARM_RETRY_DELAY * attempt).await;
                }
            }
        }
    }
    Err(RecorderError::InjectionFailure(last_error))
}

struct PendingInput {
    /// Timestamp of the latest keystroke; the descriptor keeps the first.
    ts: i64,
    visual: VisualDescriptor,
    selector: Option<String>,
    sensitive: Option<SensitiveField>,
    value: String,
}

struct PendingScroll {
    ts: i64,
    x: f64,
    y: f64,
}

pub(super) struct CaptureLoop {
    driver: Arc<dyn BrowserDriver>,
    config: RecorderConfig,
    log: Arc<RwLock<Vec<RawEvent>>>,
    progress: broadcast::Sender<RawEvent>,
    paused: Arc<AtomicBool>,
    degraded: Arc<AtomicBool>,
    current_url: String,
    last_click: Option<Instant>,
    last_ts: i64,
    typing: Debouncer<String, PendingInput>,
    scrolling: Debouncer<(), PendingScroll>,
    stopping: bool,
}

impl CaptureLoop {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        config: RecorderConfig,
        initial: &RawEvent,
        log: Arc<RwLock<Vec<RawEvent>>>,
        progress: broadcast::Sender<RawEvent>,
        paused: Arc<AtomicBool>,
        degraded: Arc<AtomicBool>,
    ) -> Self {
        let quiet = config.typing_debounce();
        Self {
            driver,
            config,
            log,
            progress,
            paused,
            degraded,
            current_url: initial.value.clone().unwrap_or_default(),
            last_click: None,
            last_ts: initial.timestamp,
            typing: Debouncer::new(quiet),
            scrolling: Debouncer::new(quiet),
            stopping: false,
        }
    }

    pub fn spawn(self, events: broadcast::Receiver<PageEvent>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(events, cancel))
    }

    async fn run(mut self, mut events: broadcast::Receiver<PageEvent>, cancel: CancellationToken) {
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = events.recv() => match received {
                    Ok(PageEvent::Closed) => {
                        warn!("Page closed while recording");
                        break;
                    }
                    Ok(event) => self.on_page_event(event).await,
                    Err(RecvError::Lagged(n)) => warn!("Capture loop lagged, {} page events lost", n),
                    Err(RecvError::Closed) => {
                        warn!("Page event stream ended");
                        break;
                    }
                },
                _ = sleep_until(deadline) => self.flush_due().await,
            }
        }

        // Events already delivered before the stop signal still count.
        self.stopping = true;
        loop {
            match events.try_recv() {
                Ok(PageEvent::Closed) | Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                Ok(event) => self.on_page_event(event).await,
                Err(TryRecvError::Lagged(n)) => warn!("{} page events lost at shutdown", n),
            }
        }
        self.flush_all().await;
        debug!("Capture loop finished");
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.typing.next_deadline(), self.scrolling.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    async fn on_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::BindingCalled { name, payload } if name == BINDING_NAME => {
                self.on_binding(&payload).await;
            }
            PageEvent::Navigated { url, same_document } => self.on_navigated(url, same_document).await,
            other => trace!("Ignoring page event {:?}", other),
        }
    }

    async fn on_binding(&mut self, raw: &str) {
        if self.paused.load(Ordering::SeqCst) {
            trace!("Paused, dropping capture payload");
            return;
        }
        let payload = match CapturePayload::parse(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Malformed capture payload: {}", e);
                return;
            }
        };
        match payload.kind {
            CaptureKind::Click => self.on_click(payload).await,
            CaptureKind::Input => self.on_input(payload).await,
            CaptureKind::Scroll => self.on_scroll(payload).await,
            CaptureKind::Upload => self.on_upload(payload).await,
        }
    }

    async fn on_click(&mut self, payload: CapturePayload) {
        self.flush_all().await;
        self.last_click = Some(Instant::now());
        let Some(element) = payload.element.as_ref() else {
            debug!("Click payload without element");
            return;
        };
        let ts = self.next_ts(payload.ts);
        let pointer = payload.x.zip(payload.y).map(|(x, y)| Point::new(x, y));
        match self.capture_target(element, pointer, payload.viewport, ts).await {
            Ok((visual, selector)) => {
                let event = RawEvent::new(RawEventKind::Click, ts).with_target(Some(visual), selector);
                self.append(event).await;
            }
            Err(e) => warn!("Skipping click on <{}>: {}", element.tag, e),
        }
    }

    /// Keystrokes on one field collapse into a single pending entry; the
    /// descriptor is captured on the first keystroke only.
    async fn on_input(&mut self, payload: CapturePayload) {
        let Some(element) = payload.element.as_ref() else {
            debug!("Input payload without element");
            return;
        };
        let key = element.path_key();
        let value = payload.value.clone().unwrap_or_default();
        for (_, scroll) in self.scrolling.drain() {
            self.emit_scroll(scroll).await;
        }
        for (_, input) in self.typing.take_others(&key) {
            self.emit_input(input).await;
        }

        let now = Instant::now();
        let ts = self.next_ts(payload.ts);
        if self.typing.update(&key, now, |p| {
            p.value = value.clone();
            p.ts = ts;
        }) {
            return;
        }
        match self.capture_target(element, None, payload.viewport, ts).await {
            Ok((visual, selector)) => {
                let pending = PendingInput {
                    ts,
                    visual,
                    selector,
                    sensitive: SensitiveField::detect(element),
                    value,
                };
                self.typing.insert(key, pending, now);
            }
            Err(e) => warn!("Skipping input on <{}>: {}", element.tag, e),
        }
    }

    async fn on_scroll(&mut self, payload: CapturePayload) {
        for (_, input) in self.typing.drain() {
            self.emit_input(input).await;
        }
        let (Some(x), Some(y)) = (payload.x, payload.y) else {
            return;
        };
        let now = Instant::now();
        if !self.scrolling.update(&(), now, |s| {
            s.x = x;
            s.y = y;
        }) {
            let ts = self.next_ts(payload.ts);
            self.scrolling.insert((), PendingScroll { ts, x, y }, now);
        }
    }

    async fn on_upload(&mut self, payload: CapturePayload) {
        self.flush_all().await;
        let Some(element) = payload.element.as_ref() else {
            debug!("Upload payload without element");
            return;
        };
        let ts = self.next_ts(payload.ts);
        match self.capture_target(element, None, payload.viewport, ts).await {
            Ok((visual, selector)) => {
                let event = RawEvent::new(RawEventKind::Upload, ts)
                    .with_target(Some(visual), selector)
                    .with_params(json!({ "files": payload.files }));
                self.append(event).await;
            }
            Err(e) => warn!("Skipping upload on <{}>: {}", element.tag, e),
        }
    }

    async fn on_navigated(&mut self, url: String, same_document: bool) {
        let kind = classify_navigation(&self.current_url, &url, same_document);
        if kind == NavigationKind::Internal {
            trace!("Ignoring navigation to {}", url);
            return;
        }
        self.flush_all().await;

        let window = self.config.navigation_click_window();
        let from_click = self.last_click.is_some_and(|at| at.elapsed() <= window);
        let paused = self.paused.load(Ordering::SeqCst);
        if kind.needs_rearm() && !from_click && !paused && url != self.current_url {
            let ts = self.next_ts(now_ms());
            self.append(RawEvent::navigate(url.as_str(), ts)).await;
        }
        debug!("Navigation {:?} to {}", kind, url);
        self.current_url = url;

        if kind.needs_rearm() && !self.stopping {
            self.rearm().await;
        }
    }

    async fn rearm(&mut self) {
        let config = &self.config;
        if let Err(e) = self
            .driver
            .wait_for_stability(config.stability_idle(), config.stability_timeout())
            .await
        {
            debug!("Page not stable after navigation: {}", e);
        }
        match arm(self.driver.as_ref(), config.injection_retries).await {
            Ok(()) => {
                if self.degraded.swap(false, Ordering::SeqCst) {
                    info!("Capture re-armed on {}", self.current_url);
                }
            }
            Err(e) => {
                self.degraded.store(true, Ordering::SeqCst);
                warn!("{} on {}; continuing with the events captured so far", e, self.current_url);
            }
        }
    }

    async fn capture_target(
        &self,
        element: &CapturedElement,
        pointer: Option<Point>,
        viewport: Option<Viewport>,
        ts: i64,
    ) -> Result<(VisualDescriptor, Option<String>), RecorderError> {
        let viewport = match viewport.filter(Viewport::is_usable) {
            Some(viewport) => viewport,
            None => self.driver.viewport().await?,
        };
        let mut visual = capture_descriptor(element, pointer, &viewport, ts)?;
        if self.config.capture_screenshots {
            self.attach_screenshots(&mut visual, element.rect).await;
        }
        let selector = selector::synthesize(element, &DriverIndex::new(self.driver.as_ref())).await;
        Ok((visual, selector))
    }

    /// Screenshots are advisory; failures leave the fields empty.
    async fn attach_screenshots(&self, visual: &mut VisualDescriptor, rect: BoundingBox) {
        match self.driver.screenshot(Some(rect)).await {
            Ok(png) => visual.screenshot = Some(BASE64.encode(png)),
            Err(e) => debug!("Element screenshot skipped: {}", e),
        }
        match self.driver.screenshot(Some(rect.padded(self.config.context_padding_px))).await {
            Ok(png) => visual.context_screenshot = Some(BASE64.encode(png)),
            Err(e) => debug!("Context screenshot skipped: {}", e),
        }
    }

    async fn flush_due(&mut self) {
        let now = Instant::now();
        for (_, input) in self.typing.take_due(now) {
            self.emit_input(input).await;
        }
        for (_, scroll) in self.scrolling.take_due(now) {
            self.emit_scroll(scroll).await;
        }
    }

    async fn flush_all(&mut self) {
        for (_, input) in self.typing.drain() {
            self.emit_input(input).await;
        }
        for (_, scroll) in self.scrolling.drain() {
            self.emit_scroll(scroll).await;
        }
    }

    async fn emit_input(&self, input: PendingInput) {
        let mut event = RawEvent::new(RawEventKind::Type, input.ts)
            .with_target(Some(input.visual), input.selector)
            .with_value(input.value);
        if let Some(field) = input.sensitive {
            event = event.masked(field);
        }
        self.append(event).await;
    }

    async fn emit_scroll(&self, scroll: PendingScroll) {
        let event = RawEvent::new(RawEventKind::Scroll, scroll.ts)
            .with_params(json!({ "x": scroll.x, "y": scroll.y }));
        self.append(event).await;
    }

    async fn append(&self, event: RawEvent) {
        debug!("Captured {:?} at {}", event.kind, event.timestamp);
        self.log.write().await.push(event.clone());
        let _ = self.progress.send(event);
    }

    /// Clamp page timestamps so the log stays non-decreasing.
    fn next_ts(&mut self, ts: i64) -> i64 {
        self.last_ts = self.last_ts.max(ts);
        self.last_ts
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
