//! Navigation classification for re-arming decisions.

use url::Url;

/// How a page transition relates to the previous document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// History API route change; the capture script survives.
    SpaRoute,
    /// New document on the same origin (form post, login redirect, reload).
    SameOrigin,
    /// New document on another origin.
    CrossOrigin,
    /// `about:`, `data:` and similar transient documents.
    Internal,
}

impl NavigationKind {
    /// Whether the capture script must be injected again.
    pub fn needs_rearm(&self) -> bool {
        matches!(self, Self::SameOrigin | Self::CrossOrigin)
    }
}

/// Classify a transition from `from` to `to`.
pub fn classify_navigation(from: &str, to: &str, same_document: bool) -> NavigationKind {
    let Ok(target) = Url::parse(to) else {
        return NavigationKind::Internal;
    };
    if !matches!(target.scheme(), "http" | "https" | "file") {
        return NavigationKind::Internal;
    }
    let same_origin = Url::parse(from).is_ok_and(|source| source.origin() == target.origin());
    if same_document && same_origin {
        NavigationKind::SpaRoute
    } else if same_origin {
        NavigationKind::SameOrigin
    } else {
        NavigationKind::CrossOrigin
    }
}
