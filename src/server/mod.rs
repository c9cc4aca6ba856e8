//! Broker core facade
//!
//! Wires the client registry, pipe binding index and channel manager into a
//! single explicitly constructed service object.

pub mod core;

pub use core::Broker;
