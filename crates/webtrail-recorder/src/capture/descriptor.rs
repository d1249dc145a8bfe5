//! Visual descriptor extraction from a captured element.

use webtrail_protocols::{MAX_SURROUNDING_TEXT, Point, Position, Viewport, VisualDescriptor};

use super::payload::CapturedElement;
use crate::error::RecorderError;

/// Longest visible-text snippet kept on a descriptor.
pub const MAX_TEXT_LEN: usize = 200;

const MAX_CONTEXT_LEN: usize = 100;

/// Build a descriptor for `element`.
///
/// Clicks pass the pointer coordinate; other interactions use the element
/// center. Fails when the element has no layout or the viewport is unusable,
/// so callers skip the interaction instead of emitting a partial descriptor.
pub fn capture_descriptor(
    element: &CapturedElement,
    pointer: Option<Point>,
    viewport: &Viewport,
    timestamp: i64,
) -> Result<VisualDescriptor, RecorderError> {
    if !viewport.is_usable() {
        return Err(RecorderError::CaptureFailure(format!(
            "unusable viewport {}x{}",
            viewport.width, viewport.height
        )));
    }
    if !element.rect.has_layout() {
        return Err(RecorderError::CaptureFailure(format!(
            "<{}> has no layout box",
            element.tag
        )));
    }

    let absolute = pointer
        .filter(|p| p.is_finite() && element.rect.padded(1.0).contains(p.x, p.y))
        .unwrap_or_else(|| element.rect.center());

    Ok(VisualDescriptor {
        text: truncate(&element.text, MAX_TEXT_LEN),
        placeholder: non_empty(element.placeholder.as_deref()),
        input_type: non_empty(element.input_type.as_deref()),
        tag: Some(element.tag.clone()),
        position: Some(Position {
            absolute,
            relative: viewport.to_relative(absolute),
        }),
        bounding_box: Some(element.rect),
        surrounding_text: surrounding_text(element),
        screenshot: None,
        context_screenshot: None,
        timestamp: Some(timestamp),
    })
}

/// Up to five distinct context strings, strongest first.
fn surrounding_text(element: &CapturedElement) -> Vec<String> {
    let own = truncate(&element.text, MAX_TEXT_LEN);
    let sources = [
        Some(element.parent_text.as_str()),
        Some(element.prev_text.as_str()),
        Some(element.next_text.as_str()),
        element.aria_label.as_deref(),
        element.placeholder.as_deref(),
    ];

    let mut out: Vec<String> = Vec::with_capacity(MAX_SURROUNDING_TEXT);
    for text in sources.into_iter().flatten() {
        let text = truncate(text, MAX_CONTEXT_LEN);
        if text.is_empty() || text == own || out.contains(&text) {
            continue;
        }
        out.push(text);
        if out.len() == MAX_SURROUNDING_TEXT {
            break;
        }
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn truncate(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max).collect()
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
