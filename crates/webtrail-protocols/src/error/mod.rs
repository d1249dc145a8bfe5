//! Error types shared across the Webtrail crates.

mod driver;
mod kind;

pub use driver::*;
pub use kind::*;
