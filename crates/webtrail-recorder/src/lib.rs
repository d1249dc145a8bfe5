//! # Webtrail Recorder
//!
//! Turns a human's interaction with a live page into a replayable list of
//! [`Action`]s.
//!
//! ## Pipeline
//!
//! 1. An injected capture script reports clicks, input, scrolls and uploads
//!    through a page binding ([`capture`]).
//! 2. Each report becomes a [`RawEvent`] carrying a [`VisualDescriptor`] and a
//!    synthesized backup selector ([`selector`]); typing and scrolling are
//!    debounced and sensitive values masked at capture time.
//! 3. On stop, the [`ActionCompiler`] normalizes the raw stream into Actions.
//!
//! [`Action`]: webtrail_protocols::Action
//! [`VisualDescriptor`]: webtrail_protocols::VisualDescriptor

pub mod backup;
pub mod capture;
mod compiler;
mod debounce;
mod error;
mod event;
mod navigation;
mod recorder;
pub mod selector;
mod sensitive;

pub use backup::{BackupStore, FileBackup, MemoryBackup};
pub use compiler::ActionCompiler;
pub use error::RecorderError;
pub use event::{RawEvent, RawEventKind};
pub use navigation::{NavigationKind, classify_navigation};
pub use recorder::{Recorder, RecorderOptions, RecorderState, RecordingSession};
pub use sensitive::SensitiveField;
