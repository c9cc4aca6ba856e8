pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod pipe;
pub mod server;
pub mod utils;

pub use server::Broker;
