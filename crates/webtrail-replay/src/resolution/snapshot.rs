//! One scan of the page shared by every non-selector strategy in an attempt.

use webtrail_protocols::{BrowserDriver, DriverError, ElementSnapshot, Viewport};

#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub viewport: Viewport,
    /// Visible elements with a layout box.
    pub elements: Vec<ElementSnapshot>,
}

impl PageSnapshot {
    pub fn new(viewport: Viewport, elements: Vec<ElementSnapshot>) -> Self {
        let elements = elements
            .into_iter()
            .filter(|e| e.visible && e.rect.has_layout())
            .collect();
        Self { viewport, elements }
    }

    pub async fn capture(driver: &dyn BrowserDriver) -> Result<Self, DriverError> {
        let viewport = driver.viewport().await?;
        let elements = driver.scan_elements().await?;
        Ok(Self::new(viewport, elements))
    }
}
