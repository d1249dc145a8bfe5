//! Element resolution: an ordered strategy chain with confidence scoring.
//!
//! Strategies are grouped into tiers by [`ResolutionMode`]. Within a tier the
//! highest-confidence candidate at or above the threshold wins, and equal
//! scores go to the strategy listed first. A later tier is consulted only
//! when the earlier one produced nothing acceptable.

mod criteria;
mod snapshot;
mod strategies;

use tracing::{debug, trace};
use webtrail_protocols::{Action, BrowserDriver, Candidate, ResolutionMethod, ResolutionMode};

use crate::error::ReplayError;
use crate::relaxation::Thresholds;

pub use criteria::{SearchCriteria, StrategyOutcome};
pub use snapshot::PageSnapshot;
pub use strategies::{
    VISUAL_WEIGHTS, VisualWeights, position_candidate, position_matches, selector_candidate,
    text_candidate, visual_candidate, visual_score,
};

use webtrail_protocols::ResolutionMethod::{Position, Selector, Text, Visual};

const SELECTOR_FIRST: &[&[ResolutionMethod]] = &[&[Selector], &[Text, Position, Visual]];
const VISUAL_FIRST: &[&[ResolutionMethod]] = &[&[Visual, Text, Position], &[Selector]];
const VISUAL_ONLY: &[&[ResolutionMethod]] = &[&[Visual, Text, Position]];

/// Strategy tiers for a mode, in evaluation order.
pub fn strategy_tiers(mode: ResolutionMode) -> &'static [&'static [ResolutionMethod]] {
    match mode {
        ResolutionMode::SelectorFirst => SELECTOR_FIRST,
        ResolutionMode::VisualFirst => VISUAL_FIRST,
        ResolutionMode::VisualOnly => VISUAL_ONLY,
    }
}

/// Locates an action's target on a live page.
#[derive(Debug, Clone, Default)]
pub struct ResolutionEngine;

impl ResolutionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Best candidate for `action` under `thresholds`.
    ///
    /// Fails with [`ReplayError::Resolution`] carrying the full search
    /// criteria and per-strategy outcomes when nothing qualifies.
    pub async fn resolve(
        &self,
        driver: &dyn BrowserDriver,
        action: &Action,
        thresholds: Thresholds,
    ) -> Result<Candidate, ReplayError> {
        let mut criteria = SearchCriteria::new(action, thresholds);
        let mut snapshot: Option<PageSnapshot> = None;

        for tier in strategy_tiers(action.resolution_mode) {
            let mut best: Option<Candidate> = None;
            for &strategy in tier.iter() {
                let found = if strategy == Selector {
                    self.by_selector(driver, &mut criteria).await
                } else {
                    if snapshot.is_none() {
                        snapshot = Some(PageSnapshot::capture(driver).await?);
                    }
                    let Some(page) = snapshot.as_ref() else {
                        continue;
                    };
                    let found = match strategy {
                        Text => text_candidate(page, &criteria),
                        Position => position_candidate(page, &criteria),
                        _ => visual_candidate(page, &criteria),
                    };
                    criteria.record(strategy, found.as_ref(), None);
                    found
                };

                if let Some(candidate) = found {
                    let accepted = candidate.confidence >= thresholds.min_confidence;
                    trace!(
                        "{} candidate {} at {:.3} ({})",
                        strategy,
                        candidate.element.handle,
                        candidate.confidence,
                        if accepted { "accepted" } else { "below threshold" }
                    );
                    if accepted && best.as_ref().is_none_or(|b| candidate.confidence > b.confidence) {
                        best = Some(candidate);
                    }
                }
            }
            if let Some(candidate) = best {
                debug!(
                    "Resolved '{}' via {} ({:.2})",
                    action.name, candidate.strategy, candidate.confidence
                );
                return Ok(candidate);
            }
        }

        Err(ReplayError::Resolution {
            message: format!(
                "no candidate for '{}' reached confidence {:.2}",
                action.name, thresholds.min_confidence
            ),
            criteria: Box::new(criteria),
        })
    }

    async fn by_selector(&self, driver: &dyn BrowserDriver, criteria: &mut SearchCriteria) -> Option<Candidate> {
        let Some(selector) = criteria.selector.clone() else {
            criteria.record(Selector, None, Some("no backup selector".to_string()));
            return None;
        };
        match driver.query_selector_all(&selector).await {
            Ok(matches) => {
                let found = selector_candidate(&matches, criteria);
                let note = format!("{} match(es)", matches.len());
                criteria.record(Selector, found.as_ref(), Some(note));
                found
            }
            Err(e) => {
                debug!("Selector {} failed: {}", selector, e);
                criteria.record(Selector, None, Some(e.to_string()));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
