//! Error types
//!
//! Defines domain-specific error types for each module of the broker core.

use std::fmt;
use std::io;

use crate::client::ClientId;

/// Pipe binding errors
#[derive(Debug)]
pub enum BindingError {
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pipe name pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// Channel lifecycle errors
#[derive(Debug)]
pub enum ChannelError {
    NotRegistered(ClientId),
    ConnectFailed { client_id: ClientId, source: io::Error },
    ConnectTimeout(ClientId),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::NotRegistered(id) => write!(f, "Client: {} is not registered", id),
            ChannelError::ConnectFailed { client_id, source } => {
                write!(f, "Failed to establish channel to {}: {}", client_id, source)
            }
            ChannelError::ConnectTimeout(id) => {
                write!(f, "Timeout establishing channel to {}", id)
            }
        }
    }
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChannelError::ConnectFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// General broker error that encompasses all error types
#[derive(Debug)]
pub enum BrokerError {
    Binding(BindingError),
    Channel(ChannelError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::Binding(e) => write!(f, "Binding error: {}", e),
            BrokerError::Channel(e) => write!(f, "Channel error: {}", e),
            BrokerError::Config(e) => write!(f, "Configuration error: {}", e),
            BrokerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for BrokerError {}

impl From<BindingError> for BrokerError {
    fn from(error: BindingError) -> Self {
        BrokerError::Binding(error)
    }
}

impl From<ChannelError> for BrokerError {
    fn from(error: ChannelError) -> Self {
        BrokerError::Channel(error)
    }
}

impl From<config::ConfigError> for BrokerError {
    fn from(error: config::ConfigError) -> Self {
        BrokerError::Config(error)
    }
}

impl From<io::Error> for BrokerError {
    fn from(error: io::Error) -> Self {
        BrokerError::IoError(error)
    }
}
