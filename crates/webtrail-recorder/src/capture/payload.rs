//! Messages sent by the capture script through the page binding.

use serde::{Deserialize, Serialize};
use webtrail_protocols::{BoundingBox, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Click,
    Input,
    Scroll,
    Upload,
}

/// One step of an element's ancestry, nearest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// 1-based position among the parent's element children.
    pub nth: u32,
}

/// Element description produced in the page at interaction time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedElement {
    pub tag: String,
    #[serde(default)]
    pub text: String,
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
    pub autocomplete: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub rect: BoundingBox,
    #[serde(default)]
    pub parent_text: String,
    #[serde(default)]
    pub prev_text: String,
    #[serde(default)]
    pub next_text: String,
    /// Ancestry from the element up to the nearest ancestor with an id, or the root.
    #[serde(default)]
    pub path: Vec<PathStep>,
}

impl CapturedElement {
    /// Stable identity for the element within the current document.
    pub fn path_key(&self) -> String {
        let mut key = String::new();
        for step in &self.path {
            if let Some(id) = &step.id {
                key.push_str(&format!("#{}/", id));
            }
            key.push_str(&format!("{}:{}/", step.tag, step.nth));
        }
        if key.is_empty() {
            format!("{}@{:.0},{:.0}", self.tag, self.rect.x, self.rect.y)
        } else {
            key
        }
    }
}

/// Wire format of one binding call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePayload {
    pub kind: CaptureKind,
    /// Page clock, milliseconds since the Unix epoch.
    pub ts: i64,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub element: Option<CapturedElement>,
}

impl CapturePayload {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_click_payload() {
        let raw = r#"{
            "kind": "click", "ts": 1700000000000, "x": 120.5, "y": 40,
            "viewport": {"width": 1280, "height": 720, "scrollX": 0, "scrollY": 0},
            "element": {
                "tag": "button", "text": "Sign in", "id": null, "type": "submit",
                "ariaLabel": "Sign in", "classes": ["btn", "primary"],
                "rect": {"x": 100, "y": 30, "width": 80, "height": 24},
                "parentText": "Sign in Forgot password?", "prevText": "", "nextText": "Forgot password?",
                "path": [{"tag": "button", "id": null, "nth": 2}, {"tag": "form", "id": "login", "nth": 1}]
            }
        }"#;
        let payload = CapturePayload::parse(raw).unwrap();
        assert_eq!(payload.kind, CaptureKind::Click);
        assert_eq!(payload.x, Some(120.5));
        let el = payload.element.unwrap();
        assert_eq!(el.input_type.as_deref(), Some("submit"));
        assert_eq!(el.aria_label.as_deref(), Some("Sign in"));
        assert_eq!(el.path.len(), 2);
        assert_eq!(el.path[1].id.as_deref(), Some("login"));
    }

    #[test]
    fn test_parse_scroll_payload_without_element() {
        let payload = CapturePayload::parse(r#"{"kind":"scroll","ts":5,"x":0,"y":800}"#).unwrap();
        assert_eq!(payload.kind, CaptureKind::Scroll);
        assert!(payload.element.is_none());
        assert!(payload.files.is_empty());
    }

    #[test]
    fn test_path_key_distinguishes_siblings() {
        let mut a = CapturedElement {
            tag: "input".into(),
            path: vec![
                PathStep { tag: "input".into(), id: None, nth: 1 },
                PathStep { tag: "form".into(), id: Some("login".into()), nth: 1 },
            ],
            ..Default::default()
        };
        let key_a = a.path_key();
        a.path[0].nth = 2;
        assert_ne!(key_a, a.path_key());
        assert!(key_a.contains("#login/"));
    }
}
