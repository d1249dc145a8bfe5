//! Raw captured events, the recorder's append-only log entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use webtrail_protocols::VisualDescriptor;

use crate::sensitive::SensitiveField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEventKind {
    Click,
    Type,
    Navigate,
    Scroll,
    Upload,
}

impl RawEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Type => "type",
            Self::Navigate => "navigate",
            Self::Scroll => "scroll",
            Self::Upload => "upload",
        }
    }
}

/// One logical interaction observed on the page, before compilation.
///
/// Values of sensitive fields are already masked when the event is logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: RawEventKind,
    /// Milliseconds since the Unix epoch; non-decreasing within a session.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<SensitiveField>,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, timestamp: i64) -> Self {
        Self {
            kind,
            timestamp,
            visual: None,
            selector: None,
            value: None,
            params: None,
            sensitive: None,
        }
    }

    pub fn navigate(url: impl Into<String>, timestamp: i64) -> Self {
        Self {
            value: Some(url.into()),
            ..Self::new(RawEventKind::Navigate, timestamp)
        }
    }

    pub fn with_target(mut self, visual: Option<VisualDescriptor>, selector: Option<String>) -> Self {
        self.visual = visual;
        self.selector = selector;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Mark as sensitive, replacing the value with its placeholder.
    pub fn masked(mut self, field: SensitiveField) -> Self {
        self.value = Some(field.placeholder());
        self.sensitive = Some(field);
        self
    }

    /// Key identifying the input target for typing merges.
    pub fn target_key(&self) -> Option<String> {
        if let Some(selector) = &self.selector {
            return Some(selector.clone());
        }
        let bbox = self.visual.as_ref()?.bounding_box?;
        Some(format!("@{:.0},{:.0}", bbox.x, bbox.y))
    }
}
