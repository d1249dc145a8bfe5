//! # Webtrail Replay
//!
//! Re-executes a recorded [`Workflow`] against a live page.
//!
//! Each action's target is located by a [`ResolutionEngine`] that runs an
//! ordered chain of strategies (selector, text, position, visual) and
//! returns the best [`Candidate`] above a confidence threshold. The
//! [`ReplayController`] drives actions one at a time, retrying failures with
//! progressively relaxed thresholds ([`RelaxationPolicy`]), and always
//! finishes with an [`ExecutionReport`].
//!
//! [`Workflow`]: webtrail_protocols::Workflow
//! [`Candidate`]: webtrail_protocols::Candidate
//! [`ExecutionReport`]: webtrail_protocols::ExecutionReport

mod artifacts;
mod controller;
mod error;
mod relaxation;
pub mod render;
pub mod resolution;
pub mod similarity;
mod template;

pub use artifacts::ArtifactStore;
pub use controller::{ReplayController, ReplayOptions};
pub use error::ReplayError;
pub use relaxation::{RelaxationPolicy, Thresholds};
pub use resolution::{ResolutionEngine, SearchCriteria, StrategyOutcome};
pub use template::{apply_variables, missing_variables};
