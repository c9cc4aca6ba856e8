//! Error handlers
//!
//! Provides error reporting helpers for the broker's request layer.

use crate::error::types::{BrokerError, ChannelError};
use log::{error, warn};

/// Log a broker error, as a warning when the caller may retry it
pub fn handle_error(err: &BrokerError) {
    if is_retryable(err) {
        warn!("Message pipe broker error (retryable): {}", err);
    } else {
        error!("Message pipe broker error: {}", err);
    }
}

/// Whether the caller may reasonably retry the failed operation.
///
/// The core never retries on its own; this only classifies the failure.
pub fn is_retryable(err: &BrokerError) -> bool {
    match err {
        BrokerError::Channel(ChannelError::NotRegistered(_)) => false,
        BrokerError::Channel(_) => true,
        BrokerError::IoError(_) => true,
        BrokerError::Binding(_) => false,
        BrokerError::Config(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientId;
    use std::io;

    #[test]
    fn test_not_registered_is_not_retryable() {
        let err = BrokerError::from(ChannelError::NotRegistered(ClientId::new("a", 1)));
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_config_error_is_not_retryable() {
        let err = BrokerError::from(config::ConfigError::Message("bad".into()));
        assert!(!is_retryable(&err));
        handle_error(&err);
    }

    #[test]
    fn test_connect_failure_is_retryable() {
        let err = BrokerError::from(ChannelError::ConnectFailed {
            client_id: ClientId::new("a", 1),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        });
        assert!(is_retryable(&err));
    }
}
