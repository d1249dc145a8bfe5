//! Backup selector synthesis.
//!
//! Candidates come from an ordered list of pure generators (id, name,
//! placeholder, data attributes, aria-label, class combinations). The first
//! candidate that matches exactly one node wins; otherwise a structural
//! `nth-child` path anchored at the nearest ancestor with an id is used.

mod generators;

use async_trait::async_trait;
use tracing::{debug, trace};
use webtrail_protocols::{BrowserDriver, DriverError};

use crate::capture::CapturedElement;

pub use generators::{GENERATORS, Generator, candidates, structural_path};

/// Counts how many nodes a selector currently matches.
#[async_trait]
pub trait LocatorIndex: Send + Sync {
    async fn count(&self, selector: &str) -> Result<usize, DriverError>;
}

/// [`LocatorIndex`] backed by live `querySelectorAll` lookups.
pub struct DriverIndex<'a> {
    driver: &'a dyn BrowserDriver,
}

impl<'a> DriverIndex<'a> {
    pub fn new(driver: &'a dyn BrowserDriver) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl LocatorIndex for DriverIndex<'_> {
    async fn count(&self, selector: &str) -> Result<usize, DriverError> {
        Ok(self.driver.query_selector_all(selector).await?.len())
    }
}

/// Synthesize a locator for `element`, or `None` when nothing identifies it.
///
/// The structural fallback is kept unless the index positively reports it as
/// ambiguous, since the recorded node may already be detached.
pub async fn synthesize(element: &CapturedElement, index: &dyn LocatorIndex) -> Option<String> {
    for candidate in candidates(element) {
        match index.count(&candidate).await {
            Ok(1) => {
                trace!("Selector {} is unique", candidate);
                return Some(candidate);
            }
            Ok(n) => trace!("Selector {} matched {} nodes", candidate, n),
            Err(e) => debug!("Selector {} rejected: {}", candidate, e),
        }
    }

    let fallback = structural_path(element)?;
    match index.count(&fallback).await {
        Ok(n) if n > 1 => {
            debug!("Structural path {} is ambiguous ({} nodes)", fallback, n);
            None
        }
        _ => Some(fallback),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
