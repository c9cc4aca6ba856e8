//! Client result types
//!
//! Defines result structures returned by client operations.

use crate::client::ClientId;

/// Result of an expiry sweep over the registry
#[derive(Debug, Clone, Default)]
pub struct ExpiryResult {
    pub expired: Vec<ClientId>,
    pub checked: usize,
}

impl ExpiryResult {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty()
    }
}
