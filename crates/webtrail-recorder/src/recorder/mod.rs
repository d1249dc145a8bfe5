//! Recording session lifecycle: `idle -> recording <-> paused -> stopped`.

mod capture_loop;
mod sync;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;
use webtrail_config::{CompilerConfig, Config, RecorderConfig};
use webtrail_protocols::{Action, BrowserDriver};

use crate::backup::BackupStore;
use crate::compiler::ActionCompiler;
use crate::error::RecorderError;
use crate::event::RawEvent;

use capture_loop::{CaptureLoop, arm, now_ms};

const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(5);
const PROGRESS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecorderOptions {
    pub recorder: RecorderConfig,
    pub compiler: CompilerConfig,
}

impl From<&Config> for RecorderOptions {
    fn from(config: &Config) -> Self {
        Self {
            recorder: config.recorder.clone(),
            compiler: config.compiler.clone(),
        }
    }
}

/// Information about a started recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSession {
    pub session_id: String,
    pub start_url: String,
    pub platform: String,
    pub started_at: DateTime<Utc>,
}

struct ActiveSession {
    info: RecordingSession,
    log: Arc<RwLock<Vec<RawEvent>>>,
    capture_cancel: CancellationToken,
    capture: JoinHandle<()>,
    sync_cancel: CancellationToken,
    sync: JoinHandle<()>,
}

/// Captures interactions on one page and compiles them into actions.
///
/// The capture loop is the only writer of the event log; the backup sync
/// task reads it on a fixed interval.
pub struct Recorder {
    driver: Arc<dyn BrowserDriver>,
    options: RecorderOptions,
    backup: Arc<dyn BackupStore>,
    state: Mutex<RecorderState>,
    paused: Arc<AtomicBool>,
    degraded: Arc<AtomicBool>,
    progress: broadcast::Sender<RawEvent>,
    active: tokio::sync::Mutex<Option<ActiveSession>>,
}

impl Recorder {
    pub fn new(driver: Arc<dyn BrowserDriver>, options: RecorderOptions, backup: Arc<dyn BackupStore>) -> Self {
        let (progress, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self {
            driver,
            options,
            backup,
            state: Mutex::new(RecorderState::Idle),
            paused: Arc::new(AtomicBool::new(false)),
            degraded: Arc::new(AtomicBool::new(false)),
            progress,
            active: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> RecorderState {
        *self.state.lock()
    }

    /// Receive every raw event as it is captured.
    pub fn subscribe(&self) -> broadcast::Receiver<RawEvent> {
        self.progress.subscribe()
    }

    /// Whether capture could not be re-armed after the last navigation.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub async fn session(&self) -> Option<RecordingSession> {
        self.active.lock().await.as_ref().map(|s| s.info.clone())
    }

    /// Number of events captured so far.
    pub async fn event_count(&self) -> usize {
        match self.active.lock().await.as_ref() {
            Some(session) => session.log.read().await.len(),
            None => 0,
        }
    }

    /// Open `url`, arm capture and start recording.
    pub async fn start(&self, url: &str, platform: &str) -> Result<RecordingSession, RecorderError> {
        let mut active = self.active.lock().await;
        self.expect_state("start", &[RecorderState::Idle])?;
        let config = &self.options.recorder;

        self.driver.navigate(url).await?;
        if let Err(e) = self
            .driver
            .wait_for_stability(config.stability_idle(), config.stability_timeout())
            .await
        {
            warn!("Start page did not settle: {}", e);
        }

        let events = self.driver.subscribe();
        arm(self.driver.as_ref(), config.injection_retries.max(1)).await?;

        let info = RecordingSession {
            session_id: Uuid::new_v4().to_string(),
            start_url: url.to_string(),
            platform: platform.to_string(),
            started_at: Utc::now(),
        };
        let initial = RawEvent::navigate(url, now_ms());
        let _ = self.progress.send(initial.clone());
        let log = Arc::new(RwLock::new(vec![initial.clone()]));
        let capture_cancel = CancellationToken::new();
        let sync_cancel = CancellationToken::new();

        self.paused.store(false, Ordering::SeqCst);
        self.degraded.store(false, Ordering::SeqCst);

        let capture = CaptureLoop::new(
            self.driver.clone(),
            config.clone(),
            &initial,
            log.clone(),
            self.progress.clone(),
            self.paused.clone(),
            self.degraded.clone(),
        )
        .spawn(events, capture_cancel.clone());
        let sync = sync::spawn_backup_sync(
            self.backup.clone(),
            info.session_id.clone(),
            log.clone(),
            config.backup_interval(),
            sync_cancel.clone(),
        );

        *active = Some(ActiveSession {
            info: info.clone(),
            log,
            capture_cancel,
            capture,
            sync_cancel,
            sync,
        });
        *self.state.lock() = RecorderState::Recording;
        info!("Recording session {} started at {}", info.session_id, url);
        Ok(info)
    }

    /// Suppress capture without tearing down the session.
    pub fn pause(&self) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        if *state != RecorderState::Recording {
            return Err(RecorderError::InvalidState {
                action: "pause",
                state: *state,
            });
        }
        self.paused.store(true, Ordering::SeqCst);
        *state = RecorderState::Paused;
        info!("Recording paused");
        Ok(())
    }

    pub fn resume(&self) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        if *state != RecorderState::Paused {
            return Err(RecorderError::InvalidState {
                action: "resume",
                state: *state,
            });
        }
        self.paused.store(false, Ordering::SeqCst);
        *state = RecorderState::Recording;
        info!("Recording resumed");
        Ok(())
    }

    /// Stop capture and compile the session into actions.
    ///
    /// The live log is preferred; the backup snapshot is used when the capture
    /// task did not shut down cleanly or the live log is empty. The capture
    /// task is joined before the sync task stops, so the final snapshot holds
    /// any typing flushed at shutdown.
    pub async fn stop(&self) -> Result<Vec<Action>, RecorderError> {
        let mut active = self.active.lock().await;
        self.expect_state("stop", &[RecorderState::Recording, RecorderState::Paused])?;
        let Some(mut session) = active.take() else {
            return Err(RecorderError::InvalidState {
                action: "stop",
                state: self.state(),
            });
        };
        let session_id = session.info.session_id.clone();

        session.capture_cancel.cancel();
        let clean = match tokio::time::timeout(TASK_JOIN_TIMEOUT, &mut session.capture).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Capture task failed: {}", e);
                false
            }
            Err(_) => {
                warn!("Capture task did not stop within {:?}", TASK_JOIN_TIMEOUT);
                session.capture.abort();
                false
            }
        };
        session.sync_cancel.cancel();
        if tokio::time::timeout(TASK_JOIN_TIMEOUT, &mut session.sync).await.is_err() {
            session.sync.abort();
        }

        let live = session.log.read().await.clone();
        let events = if clean && !live.is_empty() {
            live
        } else {
            match self.backup.load(&session_id).await {
                Ok(Some(backup)) if !backup.is_empty() => {
                    warn!("Using backup snapshot ({} events) for session {}", backup.len(), session_id);
                    backup
                }
                Ok(_) => live,
                Err(e) => {
                    warn!("Backup unavailable for session {}: {}", session_id, e);
                    live
                }
            }
        };

        let actions = ActionCompiler::new(&self.options.compiler).compile(&events);
        if let Err(e) = self.backup.remove(&session_id).await {
            warn!("Failed to remove backup for session {}: {}", session_id, e);
        }
        *self.state.lock() = RecorderState::Stopped;
        info!(
            "Recording session {} stopped: {} events, {} actions",
            session_id,
            events.len(),
            actions.len()
        );
        Ok(actions)
    }

    fn expect_state(&self, action: &'static str, allowed: &[RecorderState]) -> Result<(), RecorderError> {
        let state = self.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(RecorderError::InvalidState { action, state })
        }
    }
}
