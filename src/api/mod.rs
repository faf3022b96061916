//! Scenario API access.
//!
//! [`ScenarioApi`] speaks the typed protocol (submit, status, download) over a
//! [`Transport`]; [`HttpTransport`] is the network implementation.

pub mod client;
pub mod transport;

pub use client::{ScenarioApi, IMG2IMG_PATH, REMOVE_BACKGROUND_PATH};
pub use transport::{HttpTransport, Transport};
