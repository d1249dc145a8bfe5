//! Browser instance manager.
//!
//! Finds or launches Chrome with remote debugging and a persistent profile,
//! so logins made while recording are still valid at replay time.

mod manager_core;
mod manager_pages;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
