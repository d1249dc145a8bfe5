//! Visual descriptors: the bundle of independent signals identifying a recorded target.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Point};

/// Maximum number of surrounding-text snippets carried by a descriptor.
pub const MAX_SURROUNDING_TEXT: usize = 5;

/// Target position, both raw and viewport-relative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// CSS pixels from the viewport origin.
    pub absolute: Point,
    /// Percent of viewport width/height (0-100).
    pub relative: Point,
}

/// Multi-signal description of a recorded target element.
///
/// `position` and `bounding_box` are optional only so that an incomplete
/// record can be deserialized and rejected by [`VisualDescriptor::validate`];
/// every descriptor attached to a compiled action carries both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualDescriptor {
    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    /// Lowercase tag name of the target, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default)]
    pub position: Option<Position>,

    #[serde(default, alias = "boundingBox")]
    pub bounding_box: Option<BoundingBox>,

    #[serde(default, alias = "surroundingText")]
    pub surrounding_text: Vec<String>,

    /// Base64-encoded PNG of the element. Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    /// Base64-encoded PNG of the element with its surroundings. Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "contextScreenshot")]
    pub context_screenshot: Option<String>,

    /// Milliseconds since the Unix epoch; monotonic within a recording session.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl VisualDescriptor {
    /// A descriptor is usable iff position, bounding box and timestamp are present.
    ///
    /// Screenshots never participate in validation.
    pub fn validate(&self) -> bool {
        self.position.is_some() && self.bounding_box.is_some() && self.timestamp.is_some()
    }

    /// Recorded relative position, if any.
    pub fn relative_point(&self) -> Option<Point> {
        self.position.map(|p| p.relative)
    }

    pub fn has_screenshot(&self) -> bool {
        self.screenshot.is_some()
    }

    /// Drop image payloads, keeping every other signal.
    pub fn without_screenshots(mut self) -> Self {
        self.screenshot = None;
        self.context_screenshot = None;
        self
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
