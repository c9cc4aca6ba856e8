//! Configuration management for the message pipe broker core
//!
//! Loaded once at startup from an optional `config.toml`, with
//! `MESSAGE_PIPE_*` environment overrides and built-in defaults.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CONNECT_TIMEOUT_SECS: i64 = 5;
const DEFAULT_CLIENT_EXPIRED_THRESHOLD_SECS: i64 = 30;
const DEFAULT_EXPIRY_CHECK_INTERVAL_SECS: i64 = 5;

/// Broker core configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerConfig {
    /// Default log filter, overridden by RUST_LOG
    pub log_level: String,

    /// Deadline for opening a channel to a client
    /// Environment: MESSAGE_PIPE_CONNECT_TIMEOUT_SECS
    pub connect_timeout_secs: u64,

    /// Clients silent for longer than this are marked offline
    /// Environment: MESSAGE_PIPE_CLIENT_EXPIRED_THRESHOLD_SECS
    pub client_expired_threshold_secs: u64,

    /// How often the expiry sweep runs
    /// Environment: MESSAGE_PIPE_EXPIRY_CHECK_INTERVAL_SECS
    pub expiry_check_interval_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS as u64,
            client_expired_threshold_secs: DEFAULT_CLIENT_EXPIRED_THRESHOLD_SECS as u64,
            expiry_check_interval_secs: DEFAULT_EXPIRY_CHECK_INTERVAL_SECS as u64,
        }
    }
}

impl BrokerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Try the packaged path first, then the working directory
        let config_paths = ["message-pipe-broker/config", "config"];

        let mut builder = Self::defaults()?;
        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("MESSAGE_PIPE").try_parsing(true))
            .build()?;
        let config: BrokerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single TOML file, without environment overrides
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let config: BrokerConfig = Self::defaults()?
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        Config::builder()
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("connect_timeout_secs", DEFAULT_CONNECT_TIMEOUT_SECS)?
            .set_default(
                "client_expired_threshold_secs",
                DEFAULT_CLIENT_EXPIRED_THRESHOLD_SECS,
            )?
            .set_default(
                "expiry_check_interval_secs",
                DEFAULT_EXPIRY_CHECK_INTERVAL_SECS,
            )
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.connect_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.client_expired_threshold_secs == 0 {
            return Err(config::ConfigError::Message(
                "client_expired_threshold_secs must be greater than 0".into(),
            ));
        }

        if self.expiry_check_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "expiry_check_interval_secs must be greater than 0".into(),
            ));
        }

        if self.expiry_check_interval_secs > self.client_expired_threshold_secs {
            return Err(config::ConfigError::Message(
                "expiry_check_interval_secs cannot exceed client_expired_threshold_secs".into(),
            ));
        }

        Ok(())
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get client expiry threshold as Duration
    pub fn client_expired_threshold(&self) -> Duration {
        Duration::from_secs(self.client_expired_threshold_secs)
    }

    /// Get expiry sweep interval as Duration
    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_interval_secs)
    }
}
