//! DOM operations for CDP page session.

use serde_json::json;

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Attach local files to an `<input type="file">`.
    pub async fn set_file_input_files(
        &self,
        object_id: &str,
        files: &[String],
    ) -> Result<(), CdpError> {
        self.call(
            "DOM.setFileInputFiles",
            Some(json!({
                "objectId": object_id,
                "files": files,
            })),
        )
        .await?;
        Ok(())
    }
}
