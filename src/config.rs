use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default Gemini API endpoint used when `GENERATION_URL` is not set.
pub const DEFAULT_GENERATION_URL: &str = "https://generativelanguage.googleapis.com";

/// Default number of documents retained per session before FIFO eviction.
pub const DEFAULT_MAX_DOCUMENTS: usize = 3;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docqa server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the embedding service (Ollama-compatible `/api/embed`).
    pub embedding_url: String,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Base URL of the generative model API.
    pub generation_url: String,
    /// Generative model identifier used for answer synthesis.
    pub generation_model: String,
    /// API key sent with generative model requests.
    pub generation_api_key: String,
    /// Maximum number of documents retained per session.
    pub max_documents: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            embedding_url: load_env("EMBEDDING_URL")?,
            embedding_model: load_env("EMBEDDING_MODEL")?,
            generation_url: load_env_optional("GENERATION_URL")
                .unwrap_or_else(|| DEFAULT_GENERATION_URL.to_string()),
            generation_model: load_env("GENERATION_MODEL")?,
            generation_api_key: load_env("GENERATION_API_KEY")?,
            max_documents: load_env_optional("MAX_DOCUMENTS")
                .map(|value| {
                    value
                        .parse()
                        .ok()
                        .filter(|count| *count > 0)
                        .ok_or_else(|| ConfigError::InvalidValue("MAX_DOCUMENTS".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_MAX_DOCUMENTS),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        embedding_url = %config.embedding_url,
        embedding_model = %config.embedding_model,
        generation_model = %config.generation_model,
        max_documents = config.max_documents,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
