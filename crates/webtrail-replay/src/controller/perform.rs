//! One attempt at one action.

use std::path::PathBuf;

use tracing::debug;
use webtrail_protocols::{Action, ActionType, Candidate, ResolutionMethod};

use super::ReplayController;
use crate::artifacts::ArtifactStore;
use crate::error::ReplayError;
use crate::relaxation::Thresholds;

pub(super) struct Performed {
    pub method: ResolutionMethod,
    pub confidence: f64,
    pub highlight: Option<PathBuf>,
}

impl Performed {
    fn direct() -> Self {
        Self {
            method: ResolutionMethod::Direct,
            confidence: 1.0,
            highlight: None,
        }
    }
}

fn malformed(action: &Action, what: &str) -> ReplayError {
    ReplayError::Configuration(format!("{} action '{}' has no {}", action.action_type, action.name, what))
}

impl ReplayController {
    /// Resolve, act, verify.
    pub(super) async fn perform(
        &self,
        index: usize,
        action: &Action,
        thresholds: Thresholds,
        debug: Option<&ArtifactStore>,
    ) -> Result<Performed, ReplayError> {
        let driver = self.driver.as_ref();
        match action.action_type {
            ActionType::Navigate => {
                let url = action
                    .url()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or_else(|| malformed(action, "url"))?;
                driver.navigate(url).await?;
                self.settle().await;
                Ok(Performed::direct())
            }
            ActionType::Wait => {
                let duration = action
                    .wait_duration()
                    .ok_or_else(|| malformed(action, "duration"))?;
                tokio::time::sleep(duration).await;
                Ok(Performed::direct())
            }
            ActionType::Scroll => {
                let (x, y) = action
                    .scroll_target()
                    .ok_or_else(|| malformed(action, "scroll target"))?;
                driver.scroll_to(x, y).await?;
                Ok(Performed::direct())
            }
            ActionType::Click | ActionType::Type | ActionType::Upload => {
                if action.action_type == ActionType::Upload && action.files().is_empty() {
                    return Err(malformed(action, "files"));
                }
                let candidate = self.engine.resolve(driver, action, thresholds).await?;
                let highlight = match debug {
                    Some(store) => self.highlight(store, index, &candidate).await,
                    None => None,
                };
                self.interact(action, &candidate).await?;
                Ok(Performed {
                    method: candidate.strategy,
                    confidence: candidate.confidence,
                    highlight,
                })
            }
        }
    }

    async fn interact(&self, action: &Action, candidate: &Candidate) -> Result<(), ReplayError> {
        let driver = self.driver.as_ref();
        let element = &candidate.element;
        match action.action_type {
            ActionType::Click => {
                let center = element.rect.center();
                driver.click_at(center.x, center.y).await?;
            }
            ActionType::Type => {
                let text = action.value.as_deref().unwrap_or_default();
                driver.type_into(&element.handle, text).await?;
                // The value itself is never logged; it may be a secret.
                let read_back = driver.read_value(&element.handle).await?;
                if read_back.as_deref() != Some(text) {
                    return Err(ReplayError::execution(format!(
                        "value of {} did not match after typing",
                        element.handle
                    )));
                }
            }
            ActionType::Upload => {
                driver.set_files(&element.handle, &action.files()).await?;
            }
            ActionType::Navigate | ActionType::Wait | ActionType::Scroll => {}
        }
        Ok(())
    }

    async fn highlight(&self, store: &ArtifactStore, index: usize, candidate: &Candidate) -> Option<PathBuf> {
        if let Err(e) = self.driver.highlight(&candidate.element.rect).await {
            debug!("Highlight skipped: {}", e);
            return None;
        }
        self.capture(store, &format!("{:03}-highlight.png", index)).await
    }

    async fn settle(&self) {
        let (idle, timeout) = (self.options.stability_idle, self.options.stability_timeout);
        if let Err(e) = self.driver.wait_for_stability(idle, timeout).await {
            debug!("Page did not settle: {}", e);
        }
    }
}
