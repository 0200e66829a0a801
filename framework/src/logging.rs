//! Structured logging setup

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::env::{env_from, VarSource};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
    pub json_format: bool,
}

impl LoggingConfig {
    pub fn from_vars(vars: &dyn VarSource) -> Self {
        Self {
            default_filter: "info,lexai=debug,lexai_web=debug".to_string(),
            json_format: env_from(vars, "LOG_FORMAT", String::new()).eq_ignore_ascii_case("json"),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Returns false when a subscriber was already installed (tests, or a second
/// call), in which case the existing one stays in place.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let installed = if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };

    installed.is_ok()
}
