//! Replayable interaction steps.

mod template;
mod types;

pub use template::{MissingVariable, placeholders, substitute, substitute_json};
pub use types::{Action, ActionType, ResolutionMode};

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
