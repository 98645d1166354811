//! Writers Guild REST API client.
//!
//! A thin blocking client over `ureq`. Response bodies are decoded leniently
//! into the comment, post and track models used by the UI.

mod client;
mod types;

pub use client::*;
pub use types::*;

#[cfg(test)]
mod tests;
