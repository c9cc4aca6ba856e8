//! Client management system
//!
//! Handles client identity, status tracking and lifecycle sweeps.

pub mod operations;
pub mod registry;
pub mod results;
pub mod state;

pub use operations::expire_stale_clients;
pub use registry::ClientRegistry;
pub use results::ExpiryResult;
pub use state::{ClientId, ClientInformation, ClientStatus};
