use crate::error::ConfigError;

/// Public Goodfire inference endpoint.
pub const DEFAULT_GOODFIRE_BASE_URL: &str = "https://api.goodfire.ai";
/// Public fal.ai synchronous endpoint.
pub const DEFAULT_FAL_BASE_URL: &str = "https://fal.run";

/// Application configuration loaded from environment variables.
///
/// Credentials are required and fail loading when absent, so a misconfigured
/// process dies before any external call is attempted. Base URLs are
/// overridable so tests can point the clients at a local mock server.
#[derive(Debug, Clone)]
pub struct Config {
    pub goodfire_api_key: String,
    pub fal_key: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: String,
    pub goodfire_base_url: String,
    pub fal_base_url: String,
}

impl Config {
    /// Load `.env` (if present) and then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            goodfire_api_key: required("GOODFIRE_API_KEY")?,
            fal_key: required("FAL_KEY")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_key: required("SUPABASE_SERVICE_KEY")?,
            goodfire_base_url: optional("GOODFIRE_BASE_URL", DEFAULT_GOODFIRE_BASE_URL),
            fal_base_url: optional("FAL_BASE_URL", DEFAULT_FAL_BASE_URL),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}
