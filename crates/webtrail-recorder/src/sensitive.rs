//! Sensitive-field detection and masking.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capture::CapturedElement;

/// Category of a field whose typed value must never be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitiveField {
    Password,
    Email,
    Username,
    Caption,
}

const PASSWORD_HINTS: &[&str] = &["password", "passwd", "pwd", "passcode"];
const EMAIL_HINTS: &[&str] = &["email", "e-mail", "mail"];
const USERNAME_HINTS: &[&str] = &["username", "user_name", "user-name", "userid", "login", "account"];
const CAPTION_HINTS: &[&str] = &["caption"];

impl SensitiveField {
    /// Variable name used in the `{{name}}` placeholder.
    pub fn variable(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Email => "email",
            Self::Username => "username",
            Self::Caption => "caption",
        }
    }

    pub fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.variable())
    }

    /// Classify an input from its type, name, id, placeholder and aria-label.
    pub fn detect(element: &CapturedElement) -> Option<Self> {
        let input_type = element.input_type.as_deref().unwrap_or("").to_ascii_lowercase();
        match input_type.as_str() {
            "password" => return Some(Self::Password),
            "email" => return Some(Self::Email),
            _ => {}
        }

        let haystack = [
            element.name.as_deref(),
            element.id.as_deref(),
            element.placeholder.as_deref(),
            element.aria_label.as_deref(),
            element.autocomplete.as_deref(),
        ]
        .iter()
        .flatten()
        .map(|s| s.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

        let hit = |hints: &[&str]| hints.iter().any(|h| haystack.contains(h));
        if hit(PASSWORD_HINTS) {
            Some(Self::Password)
        } else if hit(USERNAME_HINTS) {
            Some(Self::Username)
        } else if hit(EMAIL_HINTS) {
            Some(Self::Email)
        } else if hit(CAPTION_HINTS) {
            Some(Self::Caption)
        } else {
            None
        }
    }
}

impl fmt::Display for SensitiveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variable())
    }
}
