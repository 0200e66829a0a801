mod app;
mod server;

pub use app::AppConfig;
pub use server::{ServerConfig, ServerConfigBuilder};
