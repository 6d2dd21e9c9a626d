//! # aviator_core
//!
//! Core credential and session logic for Aviator.

pub mod auth;
pub mod mail;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
