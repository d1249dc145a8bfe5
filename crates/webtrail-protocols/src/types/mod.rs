//! Common value types.

mod geometry;

pub use geometry::{BoundingBox, Point, Viewport};

/// Template variables supplied by a replay caller (`{{name}}` -> value).
pub type Variables = std::collections::HashMap<String, String>;

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
