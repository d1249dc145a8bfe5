//! BrowserManager page management.

use std::sync::Arc;

use tracing::debug;

use super::{BrowserError, BrowserManager};
use crate::driver::CdpDriver;

impl BrowserManager {
    /// Open a blank tab with the configured viewport and wrap it in a driver.
    pub async fn open_driver(&self) -> Result<CdpDriver, BrowserError> {
        self.connect().await?;
        let client = self.client().await?;

        let session = client.new_page(None).await?;
        session
            .set_viewport(self.config.viewport_width, self.config.viewport_height)
            .await?;

        let session = Arc::new(session);
        self.pages
            .write()
            .await
            .insert(session.target_id().to_string(), session.clone());

        debug!("Opened page {}", session.target_id());
        Ok(CdpDriver::new(session))
    }

    /// Close a page by target id.
    pub async fn close_page(&self, target_id: &str) -> Result<(), BrowserError> {
        let removed = self.pages.write().await.remove(target_id);
        if removed.is_none() {
            return Err(BrowserError::PageNotFound(target_id.to_string()));
        }
        let client = self.client().await?;
        client.close_page(target_id).await?;
        debug!("Closed page {}", target_id);
        Ok(())
    }
}
