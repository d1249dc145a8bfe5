//! In-page capture: the injected script, its payloads, and descriptor extraction.

mod descriptor;
mod payload;
mod script;

pub use descriptor::{MAX_TEXT_LEN, capture_descriptor};
pub use payload::{CaptureKind, CapturePayload, CapturedElement, PathStep};
pub use script::{BINDING_NAME, CAPTURE_SCRIPT};
