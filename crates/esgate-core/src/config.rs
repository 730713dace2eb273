//! Shared constants and client configuration.

use serde::{Deserialize, Serialize};

/// Name the trusted product reports about itself.
pub const PRODUCT_NAME: &str = "Elasticsearch";

/// Response header carrying the product name (7.14 and later).
pub const PRODUCT_HEADER: &str = "x-elastic-product";

/// Tagline reported in the root document by 6.x and 7.x servers.
pub const YOU_KNOW_FOR_SEARCH: &str = "You know, for Search";

/// Build flavor reported by the default (non-OSS) 7.x distribution.
pub const DEFAULT_BUILD_FLAVOR: &str = "default";

/// Path of the bootstrap probe.
pub const BOOTSTRAP_PATH: &str = "/";

/// Warning emitted when the probe is rejected for lack of privileges.
pub const SECURITY_PRIVILEGES_VALIDATION_WARNING: &str = "The client is unable to verify that the server is Elasticsearch due to security privileges on the server side.";

/// Message carried by [`crate::ClientError::NotTrustedProduct`].
pub const NOT_TRUSTED_PRODUCT_MESSAGE: &str = "The client noticed that the server is not Elasticsearch and we do not support this unknown product.";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the cluster.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `ELASTICSEARCH_URL` | Base URL of the cluster |
    /// | `ESGATE_TIMEOUT` | Request timeout in seconds |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("ELASTICSEARCH_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_url),
            timeout_secs: std::env::var("ESGATE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        std::env::remove_var("ELASTICSEARCH_URL");
        std::env::remove_var("ESGATE_TIMEOUT");

        let config = ClientConfig::from_env();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.url, "http://localhost:9200");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn test_config_from_env_overrides() {
        std::env::set_var("ELASTICSEARCH_URL", "https://search.internal:9243");
        std::env::set_var("ESGATE_TIMEOUT", "5");

        let config = ClientConfig::from_env();

        std::env::remove_var("ELASTICSEARCH_URL");
        std::env::remove_var("ESGATE_TIMEOUT");

        assert_eq!(config.url, "https://search.internal:9243");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_config_from_env_ignores_bad_timeout() {
        std::env::set_var("ESGATE_TIMEOUT", "soon");
        let config = ClientConfig::from_env();
        std::env::remove_var("ESGATE_TIMEOUT");

        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::default()
            .with_url("http://es01:9200")
            .with_timeout_secs(2);

        assert_eq!(config.url, "http://es01:9200");
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn test_config_deserialize_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"url":"http://es02:9200"}"#).unwrap();
        assert_eq!(config.url, "http://es02:9200");
        assert_eq!(config.timeout_secs, 30);
    }
}
