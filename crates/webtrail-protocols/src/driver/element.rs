//! Live element views returned by a driver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::ResolutionMethod;
use crate::types::BoundingBox;

/// Opaque, driver-assigned reference to a live element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attributes relevant to locating and classifying an element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttributes {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub test_id: Option<String>,
    #[serde(default)]
    pub data_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// A point-in-time view of a live element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub handle: ElementHandle,
    /// Lowercase tag name.
    pub tag: String,
    /// Visible text, whitespace-collapsed.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: ElementAttributes,
    /// Viewport-relative bounding rectangle in CSS pixels.
    pub rect: BoundingBox,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl ElementSnapshot {
    pub fn new(handle: impl Into<String>, tag: impl Into<String>, rect: BoundingBox) -> Self {
        Self {
            handle: ElementHandle::new(handle),
            tag: tag.into(),
            text: String::new(),
            attributes: ElementAttributes::default(),
            rect,
            visible: true,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attributes(mut self, attributes: ElementAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Text used for matching: visible text, else placeholder, else aria-label.
    pub fn label(&self) -> &str {
        if !self.text.trim().is_empty() {
            return &self.text;
        }
        self.attributes
            .placeholder
            .as_deref()
            .or(self.attributes.aria_label.as_deref())
            .unwrap_or("")
    }
}

/// A ranked match produced during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub element: ElementSnapshot,
    /// Match quality in `0..=1`.
    pub confidence: f64,
    pub strategy: ResolutionMethod,
}

impl Candidate {
    pub fn new(element: ElementSnapshot, confidence: f64, strategy: ResolutionMethod) -> Self {
        Self {
            element,
            confidence: confidence.clamp(0.0, 1.0),
            strategy,
        }
    }
}
