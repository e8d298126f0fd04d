//! API configuration.

use std::time::Duration;

use thiserror::Error;

/// Configuration that cannot be used to start the server.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// Lifetime of an issued session token
    pub session_ttl: Duration,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            jwt_secret: String::new(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = match std::env::var("API_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "API_PORT",
                value: raw,
            })?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: environment_from_env(),
            jwt_secret,
            session_ttl: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// `ENVIRONMENT`, falling back to `NODE_ENV`, then `development`.
pub fn environment_from_env() -> String {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("NODE_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "JWT_SECRET",
        "API_PORT",
        "PORT",
        "API_HOST",
        "CORS_ORIGINS",
        "ENVIRONMENT",
        "NODE_ENV",
        "SESSION_TTL_SECS",
        "METRICS_ENABLED",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_jwt_secret_is_required() {
        clear_env();
        assert!(matches!(
            ApiConfig::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        std::env::set_var("JWT_SECRET", "s3cret");
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert!(config.metrics_enabled);
        assert!(!config.is_production());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_node_env_and_port_fallbacks() {
        clear_env();
        std::env::set_var("JWT_SECRET", "s3cret");
        std::env::set_var("NODE_ENV", "production");
        std::env::set_var("PORT", "8080");
        std::env::set_var("CORS_ORIGINS", "https://a.example, https://b.example,");
        let config = ApiConfig::from_env().unwrap();
        assert!(config.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins.len(), 2);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        clear_env();
        std::env::set_var("JWT_SECRET", "s3cret");
        std::env::set_var("API_PORT", "http");
        assert!(matches!(
            ApiConfig::from_env(),
            Err(ConfigError::Invalid { key: "API_PORT", .. })
        ));
        clear_env();
    }
}
