//! # Webtrail Protocols
//!
//! Shared vocabulary for the recording pipeline and the replay engine.
//!
//! ## Contents
//!
//! - [`Action`], [`Workflow`] - the persisted record format
//! - [`VisualDescriptor`] - multi-signal description of a recorded target
//! - [`ExecutionReport`] - the structured outcome of a replay run
//! - [`BrowserDriver`] - capability interface every browser backend satisfies
//! - [`PageEvent`] - events a driver pushes from the page to the controller
//!
//! Recording and replay only ever talk to a page through [`BrowserDriver`], so
//! the CDP backend can be swapped for any other implementation.

pub mod action;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod report;
pub mod types;
pub mod workflow;

#[cfg(feature = "testing")]
pub mod testing;

pub use action::{Action, ActionType, ResolutionMode};
pub use descriptor::{MAX_SURROUNDING_TEXT, Position, VisualDescriptor};
pub use driver::{
    BrowserDriver, Candidate, ElementAttributes, ElementHandle, ElementSnapshot, PageEvent,
};
pub use error::{DriverError, ErrorKind};
pub use report::{
    ActionArtifacts, ActionResult, ErrorRecord, ExecutionReport, MethodStat, OverallStats,
    ResolutionMethod,
};
pub use types::*;
pub use workflow::Workflow;
