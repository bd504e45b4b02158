use serde::Deserialize;

/// Error loading or parsing source configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid source config: {0}")]
pub struct ConfigError(String);

/// Connection settings for the hosted backend.
///
/// Loaded from a TOML section or from the environment. Lookup order
/// follows explicit-config-first: a deployment ships a config file, and
/// the env fallback (`QALA_BASE_URL` / `QALA_API_KEY`) covers local runs.
///
/// ```toml
/// base_url = "https://example.supabase.co"
/// api_key = "service-key"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl SourceConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError(e.to_string()))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("QALA_BASE_URL")
            .map_err(|_| ConfigError("QALA_BASE_URL is not set".to_string()))?;
        Ok(Self {
            base_url,
            api_key: std::env::var("QALA_API_KEY").ok(),
        })
    }
}
