//! Configuration types for the API clients.

use serde::{Deserialize, Serialize};
use trustly_lib::ErrorShape;

/// Connection and credential settings shared by both channels.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Provider host name.
    #[serde(default = "default_host")]
    pub host: String,

    /// Provider port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to talk HTTPS.
    #[serde(default = "default_is_https")]
    pub is_https: bool,

    /// Merchant API username.
    #[serde(default)]
    pub username: String,

    /// Merchant API password.
    #[serde(default)]
    pub password: String,

    /// Error reply layout on the signed channel.
    #[serde(default)]
    pub error_shape: ErrorShape,

    /// Error reply layout on the legacy channel.
    #[serde(default = "default_legacy_error_shape")]
    pub legacy_error_shape: ErrorShape,
}

fn default_host() -> String {
    "trustly.com".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_is_https() -> bool {
    true
}

fn default_legacy_error_shape() -> ErrorShape {
    ErrorShape::Flat
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            is_https: default_is_https(),
            username: String::new(),
            password: String::new(),
            error_shape: ErrorShape::default(),
            legacy_error_shape: default_legacy_error_shape(),
        }
    }
}

impl ApiConfig {
    /// Create a configuration for the production host.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Set host, port and scheme.
    pub fn with_host(mut self, host: impl Into<String>, port: u16, is_https: bool) -> Self {
        self.host = host.into();
        self.port = port;
        self.is_https = is_https;
        self
    }

    /// Set the error layout of the signed channel.
    pub fn with_error_shape(mut self, shape: ErrorShape) -> Self {
        self.error_shape = shape;
        self
    }

    /// Set the error layout of the legacy channel.
    pub fn with_legacy_error_shape(mut self, shape: ErrorShape) -> Self {
        self.legacy_error_shape = shape;
        self
    }

    /// Scheme and host, with the port only when it is not the scheme default.
    pub fn base_url(&self) -> String {
        match (self.is_https, self.port) {
            (true, 443) => format!("https://{}", self.host),
            (true, port) => format!("https://{}:{}", self.host, port),
            (false, 80) => format!("http://{}", self.host),
            (false, port) => format!("http://{}:{}", self.host, port),
        }
    }

    /// Full URL of an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("is_https", &self.is_https)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("error_shape", &self.error_shape)
            .field("legacy_error_shape", &self.legacy_error_shape)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        let config = ApiConfig::default().with_host("test.trustly.com", 443, true);
        assert_eq!(config.base_url(), "https://test.trustly.com");

        let config = config.with_host("test.trustly.com", 80, true);
        assert_eq!(config.base_url(), "https://test.trustly.com:80");

        let config = config.with_host("test.trustly.com", 80, false);
        assert_eq!(config.base_url(), "http://test.trustly.com");

        let config = config.with_host("test.trustly.com", 443, false);
        assert_eq!(config.base_url(), "http://test.trustly.com:443");
        assert_eq!(config.url("/api/1"), "http://test.trustly.com:443/api/1");
    }

    #[test]
    fn test_serde_defaults() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"username": "merchant", "password": "secret"}"#).unwrap();
        assert_eq!(config.host, "trustly.com");
        assert_eq!(config.port, 443);
        assert!(config.is_https);
        assert_eq!(config.error_shape, ErrorShape::Nested);
        assert_eq!(config.legacy_error_shape, ErrorShape::Flat);

        let config: ApiConfig =
            serde_json::from_str(r#"{"host": "test.trustly.com", "error_shape": "flat"}"#).unwrap();
        assert_eq!(config.host, "test.trustly.com");
        assert_eq!(config.error_shape, ErrorShape::Flat);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ApiConfig::new("merchant", "hunter2");
        let printed = format!("{:?}", config);
        assert!(printed.contains("merchant"));
        assert!(!printed.contains("hunter2"));
    }
}
