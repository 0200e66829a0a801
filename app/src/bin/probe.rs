//! One-shot Gemini connectivity check
//!
//! Prints whether a key is configured, the models it can see, and the reply
//! to a fixed prompt. Failures are printed and the exit code stays 0.

use std::path::Path;

use lexai::gemini::GeminiClient;
use web::config::{env, env_optional, load_dotenv};
use web::{init_tracing, LoggingConfig, ProcessEnv};

const PROMPT: &str = "Say hello!";

#[tokio::main]
async fn main() {
    load_dotenv(Path::new("."));
    init_tracing(&LoggingConfig::from_vars(&ProcessEnv));

    let api_key: Option<String> = env_optional("GEMINI_KEY");
    println!("API key exists: {}", api_key.is_some());

    let client = GeminiClient::new(api_key.unwrap_or_default());

    match client.list_models().await {
        Ok(models) => {
            println!("Available models:");
            for model in models {
                println!("- {}", model.name);
            }
            println!("Gemini client version: {}", GeminiClient::VERSION);
        }
        Err(err) => println!("Error listing models: {}", err),
    }

    let model = env("GEMINI_PROBE_MODEL", "gemini-pro".to_string());
    match client.generate_content(&model, PROMPT).await {
        Ok(text) => println!("Model response: {}", text),
        Err(err) => println!("Error using model: {}", err),
    }
}
