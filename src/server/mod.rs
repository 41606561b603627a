pub mod config;
mod error;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;
mod tracks;

pub use config::ServerConfig;
pub use error::ErrorResponse;
pub use http_layers::*;
pub use server::run_server;
