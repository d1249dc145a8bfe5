//! Action record types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::template::placeholders;
use crate::descriptor::VisualDescriptor;

/// Kind of interaction an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Click,
    Type,
    Navigate,
    Upload,
    Scroll,
    Wait,
}

impl ActionType {
    /// Whether executing this action requires locating a target element.
    pub fn needs_target(&self) -> bool {
        matches!(self, Self::Click | Self::Type | Self::Upload)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Type => "type",
            Self::Navigate => "navigate",
            Self::Upload => "upload",
            Self::Scroll => "scroll",
            Self::Wait => "wait",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy controlling whether selector- or descriptor-based matching runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionMode {
    #[default]
    SelectorFirst,
    VisualFirst,
    VisualOnly,
}

impl ResolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectorFirst => "selectorFirst",
            Self::VisualFirst => "visualFirst",
            Self::VisualOnly => "visualOnly",
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "selectorFirst" | "selector_first" => Ok(Self::SelectorFirst),
            "visualFirst" | "visual_first" => Ok(Self::VisualFirst),
            "visualOnly" | "visual_only" => Ok(Self::VisualOnly),
            other => Err(format!("unknown resolution mode: {}", other)),
        }
    }
}

/// One recorded or replayable interaction step.
///
/// Created once during recording/compilation and never mutated after it is
/// persisted inside a [`crate::Workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDescriptor>,

    /// Synthesized locator; serialized as `null` when absent.
    #[serde(default)]
    pub backup_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    #[serde(default, alias = "resolutionMode")]
    pub resolution_mode: ResolutionMode,
}

impl Action {
    fn base(action_type: ActionType, name: impl Into<String>) -> Self {
        Self {
            action_type,
            name: name.into(),
            visual: None,
            backup_selector: None,
            value: None,
            params: None,
            resolution_mode: ResolutionMode::default(),
        }
    }

    pub fn click(
        name: impl Into<String>,
        visual: Option<VisualDescriptor>,
        backup_selector: Option<String>,
    ) -> Self {
        Self {
            visual,
            backup_selector,
            ..Self::base(ActionType::Click, name)
        }
    }

    pub fn type_text(
        name: impl Into<String>,
        visual: Option<VisualDescriptor>,
        backup_selector: Option<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            visual,
            backup_selector,
            value: Some(value.into()),
            ..Self::base(ActionType::Type, name)
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            value: Some(url.clone()),
            ..Self::base(ActionType::Navigate, format!("Navigate to {}", url))
        }
    }

    pub fn wait(duration: Duration) -> Self {
        let ms = duration.as_millis() as u64;
        Self {
            params: Some(json!({ "duration_ms": ms })),
            ..Self::base(ActionType::Wait, format!("Wait {}ms", ms))
        }
    }

    pub fn scroll(x: f64, y: f64) -> Self {
        Self {
            params: Some(json!({ "x": x, "y": y })),
            ..Self::base(ActionType::Scroll, format!("Scroll to ({:.0}, {:.0})", x, y))
        }
    }

    pub fn upload(
        name: impl Into<String>,
        visual: Option<VisualDescriptor>,
        backup_selector: Option<String>,
        files: Vec<String>,
    ) -> Self {
        Self {
            visual,
            backup_selector,
            params: Some(json!({ "files": files })),
            ..Self::base(ActionType::Upload, name)
        }
    }

    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.resolution_mode = mode;
        self
    }

    /// Navigation target: `value`, falling back to `params.url`.
    pub fn url(&self) -> Option<&str> {
        self.value
            .as_deref()
            .or_else(|| self.params.as_ref().and_then(|p| p["url"].as_str()))
    }

    /// Wait duration from `params.duration_ms`.
    pub fn wait_duration(&self) -> Option<Duration> {
        self.params
            .as_ref()
            .and_then(|p| p["duration_ms"].as_u64())
            .map(Duration::from_millis)
    }

    /// Scroll target from `params.{x,y}`.
    pub fn scroll_target(&self) -> Option<(f64, f64)> {
        let params = self.params.as_ref()?;
        Some((params["x"].as_f64()?, params["y"].as_f64()?))
    }

    /// Files for an upload: `params.files`, falling back to a comma-separated `value`.
    pub fn files(&self) -> Vec<String> {
        if let Some(files) = self.params.as_ref().and_then(|p| p["files"].as_array()) {
            return files
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect();
        }
        self.value
            .as_deref()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the action carries enough information to be executed.
    pub fn is_executable(&self) -> bool {
        match self.action_type {
            ActionType::Click | ActionType::Type | ActionType::Upload => {
                self.visual.as_ref().is_some_and(|v| v.validate())
                    || self.backup_selector.as_ref().is_some_and(|s| !s.is_empty())
            }
            ActionType::Navigate => self.url().is_some_and(|u| !u.is_empty()),
            ActionType::Wait => self.wait_duration().is_some(),
            ActionType::Scroll => self.scroll_target().is_some(),
        }
    }

    /// Template variable names referenced by `value` and `params`.
    pub fn placeholders(&self) -> Vec<String> {
        let mut found = Vec::new();
        if let Some(value) = &self.value {
            found.extend(placeholders(value));
        }
        if let Some(params) = &self.params {
            collect_json_placeholders(params, &mut found);
        }
        let mut names: Vec<String> = Vec::with_capacity(found.len());
        for name in found {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

fn collect_json_placeholders(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(placeholders(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_json_placeholders(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_json_placeholders(v, out)),
        _ => {}
    }
}
