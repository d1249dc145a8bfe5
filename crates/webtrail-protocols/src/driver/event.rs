//! Events pushed from a live page to its controller.

use serde::{Deserialize, Serialize};

/// An event observed on a driven page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PageEvent {
    /// An in-page script invoked a registered binding.
    BindingCalled { name: String, payload: String },
    /// The main frame committed a new URL.
    Navigated { url: String, same_document: bool },
    /// The load event fired for the current document.
    Loaded,
    /// The page or its session went away.
    Closed,
}
