use super::resolver::SecretSource;

/// Placeholder used when `SESSION_SECRET` is unset
pub const DEFAULT_SESSION_SECRET: &str = "lexai-insecure-session-secret";

/// Session signing configuration
#[derive(Clone, PartialEq)]
pub struct SessionConfig {
    pub secret: String,
    pub source: SecretSource,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}
