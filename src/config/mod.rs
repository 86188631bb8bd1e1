mod client;
mod server;

pub use client::{ClientConfig, DEFAULT_SERVER_URL, SERVER_URL_ENV, config_path};
pub use server::ServerConfig;
