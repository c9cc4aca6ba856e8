//! Message Pipe Broker - Entry Point
//!
//! Starts the client-membership and connection-routing core and keeps its
//! expiry monitor running until interrupted.

use log::{error, info};
use std::sync::Arc;

use message_pipe_broker::Broker;
use message_pipe_broker::config::BrokerConfig;
use message_pipe_broker::error::BrokerError;
use message_pipe_broker::error::handlers::handle_error;
use message_pipe_broker::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    let config = match BrokerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            setup_logging("info");
            handle_error(&BrokerError::from(e));
            std::process::exit(1);
        }
    };

    setup_logging(&config.log_level);
    info!("Launching message pipe broker core...");

    let broker = Arc::new(Broker::new(config));
    broker.start_expiry_monitor().await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down message pipe broker core");
    broker.shutdown().await;
}
