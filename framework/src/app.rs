//! Application builder
//!
//! Provides a fluent builder API to configure and run an application.
//!
//! # Example
//!
//! ```rust,ignore
//! use lexai_web::Application;
//!
//! #[tokio::main]
//! async fn main() {
//!     Application::new()
//!         .config(config::register_all)
//!         .routes(routes::register)
//!         .bootstrap(bootstrap::register)
//!         .run()
//!         .await;
//! }
//! ```
//!
//! Startup order is fixed: configuration, routes, then bootstrap of ancillary
//! services. A configuration error aborts startup. A bootstrap error (or panic)
//! is logged and the server starts with an empty container.

use crate::config::{Config, ProcessEnv, ServerConfig};
use crate::container::Container;
use crate::context::AppContext;
use crate::error::FrameworkError;
use crate::logging::{init_tracing, LoggingConfig};
use crate::routing::Router;
use crate::server::Server;
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

/// CLI structure for applications
#[derive(Parser)]
#[command(name = "lexai")]
#[command(about = "LexAI application server and utilities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server (default command)
    Serve {
        /// Override SERVER_HOST
        #[arg(long)]
        host: Option<String>,
        /// Override SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved named configuration with secrets masked
    #[command(name = "config:show")]
    ConfigShow,
}

type ConfigFn = Box<dyn FnOnce(&mut Config) -> Result<(), FrameworkError> + Send>;
type RoutesFn = Box<dyn FnOnce() -> Router + Send>;
type BootstrapFuture = Pin<Box<dyn Future<Output = Result<Container, FrameworkError>> + Send>>;
type BootstrapFn = Box<dyn FnOnce(Arc<Config>) -> BootstrapFuture + Send>;

/// Application builder
pub struct Application {
    config_fn: Option<ConfigFn>,
    routes_fn: Option<RoutesFn>,
    bootstrap_fn: Option<BootstrapFn>,
}

impl Application {
    /// Create a new application builder
    pub fn new() -> Self {
        Application {
            config_fn: None,
            routes_fn: None,
            bootstrap_fn: None,
        }
    }

    /// Register a configuration function
    ///
    /// Runs first, with the store already holding the framework defaults.
    /// An error here stops startup.
    pub fn config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Config) -> Result<(), FrameworkError> + Send + 'static,
    {
        self.config_fn = Some(Box::new(f));
        self
    }

    /// Register a routes function
    pub fn routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Router + Send + 'static,
    {
        self.routes_fn = Some(Box::new(f));
        self
    }

    /// Register a bootstrap function
    ///
    /// Receives the finished configuration and returns the container of
    /// services shared with request handlers.
    pub fn bootstrap<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce(Arc<Config>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Container, FrameworkError>> + Send + 'static,
    {
        self.bootstrap_fn = Some(Box::new(move |config| Box::pin(f(config))));
        self
    }

    /// Run the application
    ///
    /// Parses CLI arguments and executes the appropriate command:
    /// - `serve` (default): Run the web server
    /// - `config:show`: Print the resolved configuration
    pub async fn run(self) -> Result<(), FrameworkError> {
        let cli = Cli::parse();

        let mut config = Config::init(Path::new("."));
        init_tracing(&LoggingConfig::from_vars(&ProcessEnv));

        match cli.command {
            Some(Commands::ConfigShow) => {
                if let Some(config_fn) = self.config_fn {
                    config_fn(&mut config)?;
                }
                for (key, value) in config.values() {
                    println!("{} = {}", key, value.redacted());
                }
                Ok(())
            }
            None => self.build(config).await?.run().await,
            Some(Commands::Serve { host, port }) => {
                let mut server = self.build(config).await?;
                if let Some(host) = host {
                    server = server.host(&host);
                }
                if let Some(port) = port {
                    server = server.port(port);
                }
                server.run().await
            }
        }
    }

    /// Run the startup sequence and return a server ready to accept requests
    pub async fn build(self, mut config: Config) -> Result<Server, FrameworkError> {
        let Application {
            config_fn,
            routes_fn,
            bootstrap_fn,
        } = self;

        tracing::info!(environment = %config.environment(), "application bootstrap starting");

        if let Some(config_fn) = config_fn {
            config_fn(&mut config)?;
        }

        let router = routes_fn.map(|f| f()).unwrap_or_default();

        let config = Arc::new(config);
        let container = match bootstrap_fn {
            Some(bootstrap_fn) => run_bootstrap(bootstrap_fn, config.clone()).await,
            None => Container::new(),
        };

        let context = Arc::new(AppContext::new(config, container));
        let server = Server::new(router, context);

        if let Some(server_config) = server.context().config().borrow::<ServerConfig>() {
            tracing::info!(
                host = %server_config.host,
                port = server_config.port,
                max_body_size = server.max_body_size(),
                "application ready"
            );
        }
        Ok(server)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the bootstrap step, absorbing errors and panics
async fn run_bootstrap(bootstrap_fn: BootstrapFn, config: Arc<Config>) -> Container {
    match tokio::spawn(bootstrap_fn(config)).await {
        Ok(Ok(container)) => container,
        Ok(Err(err)) => {
            tracing::error!(error = %err, "bootstrap failed; continuing without services");
            Container::new()
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "bootstrap panicked; continuing without services");
            Container::new()
        }
    }
}
