//! Error handling
//!
//! Defines error types and handling for the broker core.

pub mod handlers;
pub mod types;

pub use types::*;
