//! `webtrail record`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use webtrail_cdp::{BrowserManager, BrowserManagerConfig};
use webtrail_config::Config;
use webtrail_protocols::{BrowserDriver, Workflow};
use webtrail_recorder::{FileBackup, Recorder, RecorderOptions, RecorderState};

/// Record from `url` until Ctrl-C, then compile and save the workflow.
pub(crate) async fn run_record(
    config: &Config,
    url: &str,
    platform: &str,
    name: Option<String>,
    output: &Path,
) -> anyhow::Result<()> {
    let manager = BrowserManager::new(BrowserManagerConfig::from(&config.browser));
    let driver: Arc<dyn BrowserDriver> = Arc::new(manager.open_driver().await?);
    let backup = Arc::new(FileBackup::new(config.recorder.backup_dir.clone()).await?);
    let recorder = Recorder::new(driver, RecorderOptions::from(config), backup);

    let mut progress = recorder.subscribe();
    let session = recorder.start(url, platform).await?;
    println!(
        "Recording {} (session {}). Press Ctrl-C to finish.",
        session.start_url, session.session_id
    );
    if recorder.is_degraded() {
        warn!("Capture is degraded; some interactions may be missed");
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = progress.recv() => match event {
                Ok(event) => println!(
                    "  {:<9} {}",
                    event.kind.as_str(),
                    event.target_key().or(event.value).unwrap_or_default()
                ),
                Err(RecvError::Lagged(skipped)) => warn!("Progress display skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
        if recorder.state() == RecorderState::Stopped {
            break;
        }
    }

    let actions = recorder.stop().await?;
    let name = name.unwrap_or_else(|| {
        output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workflow".to_string())
    });
    let workflow = Workflow::new(name, platform, actions);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, workflow.to_json()?)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    info!("Saved {} actions to {}", workflow.len(), output.display());
    println!("Saved workflow '{}' ({} actions) to {}", workflow.name, workflow.len(), output.display());
    let _ = manager.close().await;
    Ok(())
}
