//! TenderDesk Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub lists: ListConfig,
    pub invoice: InvoiceConfig,
    pub downloads: DownloadConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the tender-listing REST API
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Serve every request from the in-memory fixture store
    pub mock: bool,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 30_000,
            mock: false,
            user_agent: format!("TenderDesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where the bearer token and user are persisted between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file path; empty means the platform cache directory
    pub path: String,
}

/// List page behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
    /// Search debounce window in milliseconds
    pub debounce_ms: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            debounce_ms: 500,
        }
    }
}

/// Issuer details printed on pro-forma invoices
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    pub issuer_name: String,
    pub issuer_address: String,
    pub issuer_fiscal_number: String,
    pub issuer_email: String,
    pub issuer_phone: String,
    pub bank_account: String,
    pub currency: String,
    /// VAT rate in percent applied on top of the package price
    pub vat_percent: f64,
    pub output_dir: String,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            issuer_name: "TenderDesk".to_string(),
            issuer_address: String::new(),
            issuer_fiscal_number: String::new(),
            issuer_email: String::new(),
            issuer_phone: String::new(),
            bank_account: String::new(),
            currency: "EUR".to_string(),
            vat_percent: 0.0,
            output_dir: ".".to_string(),
        }
    }
}

/// Tender document download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub dir: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: "./downloads".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.mock {
            let url = self.api.base_url.trim();
            if url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "api.base_url is required unless api.mock is enabled".to_string(),
                ));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "api.base_url must start with http:// or https://, got '{}'",
                    url
                )));
            }
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.lists.page_size == 0 || self.lists.page_size > 500 {
            return Err(ConfigError::ValidationError(
                "lists.page_size must be between 1 and 500".to_string(),
            ));
        }
        if self.invoice.vat_percent < 0.0 {
            return Err(ConfigError::ValidationError(
                "invoice.vat_percent cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# TenderDesk Configuration
# Environment variables (TENDERDESK_*) override these settings

[api]
base_url = "http://localhost:5000/api"
timeout_ms = 30000
mock = false

[session]
path = ""  # empty = platform cache dir

[lists]
page_size = 10
debounce_ms = 500

[invoice]
issuer_name = "TenderDesk"
issuer_address = ""
issuer_fiscal_number = ""
issuer_email = ""
issuer_phone = ""
bank_account = ""
currency = "EUR"
vat_percent = 0.0
output_dir = "."

[downloads]
dir = "./downloads"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.lists.debounce_ms, 500);
        assert_eq!(config.invoice.currency, "EUR");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("[api]\nmock = true\n").unwrap();
        assert!(config.api.mock);
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.lists.page_size, 10);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "localhost:5000".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.api.mock = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = AppConfig::default();
        config.lists.page_size = 0;
        assert!(config.validate().is_err());
    }
}
