//! Client configuration for reaching the catalog service.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:21000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for `HttpCatalogClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_token: std::env::var("CATALOG_API_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            timeout: Duration::from_secs(
                std::env::var("CATALOG_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

impl ClientConfig {
    /// Explicit configuration, ignoring the environment.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load from the environment, reading a `.env` file first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::default()
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_defaults() {
        let config = ClientConfig::new("https://tenant.example.com");
        assert_eq!(config.base_url, "https://tenant.example.com");
        assert!(config.api_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ClientConfig::new("https://tenant.example.com/");
        assert_eq!(
            config.endpoint("/api/meta/entity/bulk"),
            "https://tenant.example.com/api/meta/entity/bulk"
        );
        assert_eq!(
            config.endpoint("api/meta/search/indexsearch"),
            "https://tenant.example.com/api/meta/search/indexsearch"
        );
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::new("http://localhost")
            .with_api_token("secret")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
