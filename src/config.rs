use crate::analyzer::BestShopPolicy;
use crate::model::Domain;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Overrides `api_base_url` from the file when set.
pub const API_URL_ENV: &str = "BAG_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    #[serde(default = "default_para_path")]
    pub para_path: String,
    #[serde(default = "default_retail_path")]
    pub retail_path: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub best_shop_policy: BestShopPolicy,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_para_path() -> String {
    "/para/products".into()
}

fn default_retail_path() -> String {
    "/products".into()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_database_path() -> String {
    "bag.db".into()
}

fn default_currency() -> String {
    "DT".into()
}

impl AppConfig {
    pub fn domain_path(&self, domain: Domain) -> &str {
        match domain {
            Domain::Para => &self.para_path,
            Domain::Retail => &self.retail_path,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("request_timeout_seconds must be positive".into()));
        }
        if self.refresh_interval_seconds == 0 {
            return Err(ConfigError::Invalid("refresh_interval_seconds must be positive".into()));
        }
        Ok(())
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let url_override = std::env::var(API_URL_ENV).ok();
    parse_config(&content, url_override)
}

fn parse_config(content: &str, url_override: Option<String>) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    if let Some(url) = url_override.filter(|u| !u.trim().is_empty()) {
        config.api_base_url = url;
    }
    config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = parse_config(r#"{ "api_base_url": "https://api.example.com/api/v1/" }"#, None).unwrap();
        assert_eq!(cfg.api_base_url, "https://api.example.com/api/v1");
        assert_eq!(cfg.domain_path(Domain::Para), "/para/products");
        assert_eq!(cfg.domain_path(Domain::Retail), "/products");
        assert_eq!(cfg.request_timeout_seconds, 10);
        assert_eq!(cfg.best_shop_policy, BestShopPolicy::FullestCoverage);
        assert_eq!(cfg.currency, "DT");
    }

    #[test]
    fn env_override_replaces_base_url() {
        let cfg = parse_config(
            r#"{ "api_base_url": "https://a", "best_shop_policy": "cheapest_total" }"#,
            Some("https://b/".into()),
        )
        .unwrap();
        assert_eq!(cfg.api_base_url, "https://b");
        assert_eq!(cfg.best_shop_policy, BestShopPolicy::CheapestTotal);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = parse_config(r#"{ "api_base_url": "https://a", "request_timeout_seconds": 0 }"#, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_missing_base_url() {
        assert!(matches!(parse_config("{}", None), Err(ConfigError::Parse(_))));
    }
}
