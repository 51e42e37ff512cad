//! Development server module.

pub mod config;
pub mod server;

pub use config::DevConfig;
pub use server::DevServer;
