use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

pub const DEFAULT_CONFIG_FILE: &str = "chemviz.toml";
pub const ENV_PREFIX: &str = "CHEMVIZ_";

/// Runtime settings. Later sources override earlier ones:
/// built-in defaults, then `chemviz.toml`, then `CHEMVIZ_*` variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,

    #[validate(length(min = 1))]
    pub database_url: String,

    #[validate(range(min = 1))]
    pub max_connections: u32,

    /// Datasets retained before the oldest is evicted
    #[validate(range(min = 1))]
    pub max_datasets: i64,

    pub log_filter: String,

    /// Tokens accepted in `Authorization: Token <key>`
    pub api_tokens: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: "sqlite://chemviz.db".to_string(),
            max_connections: 4,
            max_datasets: 5,
            log_filter: "info".to_string(),
            api_tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load `.env`, the default config file and the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(Self::figment(Path::new(DEFAULT_CONFIG_FILE)))
    }

    pub fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load config: {}", e)))?;

        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid config: {}", e)))?;

        Ok(config)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_datasets, 5);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(
            Toml::string(
                r#"
                port = 9100
                database_url = "sqlite::memory:"
                api_tokens = ["alpha", "beta"]
                "#,
            ),
        );

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.api_tokens, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("max_datasets = 0"));

        let err = AppConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
