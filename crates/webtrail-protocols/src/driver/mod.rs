//! Browser driver capability interface.
//!
//! The resolution engine, replay controller and recorder depend only on
//! [`BrowserDriver`]; concrete backends (CDP clients, test doubles) implement it.

mod element;
mod event;
mod traits;

pub use element::{Candidate, ElementAttributes, ElementHandle, ElementSnapshot};
pub use event::PageEvent;
pub use traits::{BrowserDriver, HIGHLIGHT_SCRIPT};
