use crate::config::env::{env_from, Environment, VarSource};

/// Application identity and mode
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_vars(vars: &dyn VarSource) -> Self {
        let environment = Environment::detect_from(vars);
        Self {
            name: env_from(vars, "APP_NAME", "LexAI".to_string()),
            // debug defaults off in production
            debug: env_from(vars, "APP_DEBUG", !environment.is_production()),
            environment,
        }
    }
}
