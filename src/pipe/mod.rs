//! Message pipe bindings
//!
//! Tracks which clients serve which pipe name patterns.

pub mod bindings;
pub mod pattern;

pub use bindings::PipeBindingIndex;
pub use pattern::PipePattern;
