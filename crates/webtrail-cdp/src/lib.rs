//! # Webtrail CDP
//!
//! Chrome DevTools Protocol backend for the Webtrail [`BrowserDriver`].
//!
//! ## Layers
//!
//! - [`cdp`] - WebSocket client, per-page sessions and the page event pump
//! - [`BrowserManager`] - finds or launches Chrome with a persistent profile
//! - [`CdpDriver`] - [`BrowserDriver`] implementation over a page session
//!
//! [`BrowserDriver`]: webtrail_protocols::BrowserDriver

pub mod cdp;
mod driver;
mod manager;
mod scripts;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use driver::CdpDriver;
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
