use web::mask_secret;

use super::resolver::SecretSource;

/// Placeholder used when `GEMINI_KEY` is unset. Requests made with it fail.
pub const DEFAULT_GEMINI_KEY: &str = "gemini-key-not-configured";

/// Generative AI configuration
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    /// API key sent with every Gemini request
    pub api_key: String,
    /// Where the key came from
    pub source: SecretSource,
}

impl GeminiConfig {
    /// The key as it may appear in logs
    pub fn masked_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.masked_key())
            .field("source", &self.source)
            .finish()
    }
}
