//! `{{name}}` template placeholders inside action values and params.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::types::Variables;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("valid regex"));

/// A placeholder with no value in the supplied variable map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing template variable: {0}")]
pub struct MissingVariable(pub String);

/// Names referenced by `{{name}}` placeholders, in order of appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Replace every placeholder in `text` with its value.
pub fn substitute(text: &str, vars: &Variables) -> Result<String, MissingVariable> {
    if let Some(missing) = placeholders(text).into_iter().find(|n| !vars.contains_key(n)) {
        return Err(MissingVariable(missing));
    }
    Ok(PLACEHOLDER
        .replace_all(text, |cap: &regex::Captures<'_>| vars[&cap[1]].clone())
        .into_owned())
}

/// Substitute placeholders in every string inside a JSON value.
pub fn substitute_json(value: &Value, vars: &Variables) -> Result<Value, MissingVariable> {
    Ok(match value {
        Value::String(s) => Value::String(substitute(s, vars)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| substitute_json(v, vars))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), substitute_json(v, vars)?)))
                .collect::<Result<_, MissingVariable>>()?,
        ),
        other => other.clone(),
    })
}
