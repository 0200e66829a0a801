pub mod app;
pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod http;
pub mod logging;
pub mod routing;
pub mod server;

pub use app::Application;
pub use config::{
    env, env_from, mask_secret, Config, ConfigValue, Environment, ProcessEnv, ServerConfig,
    VarSource,
};
pub use container::Container;
pub use context::AppContext;
pub use error::FrameworkError;
pub use http::{json, text, HttpResponse, Request, Response};
pub use logging::{init_tracing, LoggingConfig};
pub use routing::{GroupRouter, Router};
pub use server::{dispatch, Server};

// Re-export for handler and test code
pub use async_trait::async_trait;
pub use serde_json::json as json_value;
