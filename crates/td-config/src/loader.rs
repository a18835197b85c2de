//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "tenderdesk.toml",
    "config.toml",
    "./config/tenderdesk.toml",
    "/etc/tenderdesk/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup)? {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use.
    ///
    /// An explicitly requested file that does not exist is an error; the
    /// standard search paths are optional.
    fn find_config_file<F>(&self, lookup: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Ok(Some(path.clone()));
            }
            return Err(ConfigError::ValidationError(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        if let Some(path) = lookup("TENDERDESK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(ConfigError::ValidationError(format!(
                "TENDERDESK_CONFIG points at a missing file: {}",
                path.display()
            )));
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides
fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // API
    if let Some(val) = lookup("TENDERDESK_API_URL") {
        config.api.base_url = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = lookup("TENDERDESK_API_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.api.timeout_ms = timeout;
        }
    }
    if let Some(val) = lookup("TENDERDESK_MOCK") {
        if let Some(flag) = parse_flag(&val) {
            config.api.mock = flag;
        }
    }

    // Session
    if let Some(val) = lookup("TENDERDESK_SESSION_PATH") {
        config.session.path = val;
    }

    // Lists
    if let Some(val) = lookup("TENDERDESK_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.lists.page_size = size;
        }
    }
    if let Some(val) = lookup("TENDERDESK_DEBOUNCE_MS") {
        if let Ok(ms) = val.parse() {
            config.lists.debounce_ms = ms;
        }
    }

    // Invoice
    if let Some(val) = lookup("TENDERDESK_INVOICE_ISSUER") {
        config.invoice.issuer_name = val;
    }
    if let Some(val) = lookup("TENDERDESK_INVOICE_CURRENCY") {
        config.invoice.currency = val;
    }
    if let Some(val) = lookup("TENDERDESK_INVOICE_DIR") {
        config.invoice.output_dir = val;
    }

    // Downloads
    if let Some(val) = lookup("TENDERDESK_DOWNLOAD_DIR") {
        config.downloads.dir = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"https://file.example/api\"\n[lists]\npage_size = 20").unwrap();

        let loader = ConfigLoader::with_path(file.path());
        let config = loader
            .load_with(lookup_from(&[
                ("TENDERDESK_API_URL", "https://env.example/api/"),
                ("TENDERDESK_DEBOUNCE_MS", "250"),
            ]))
            .unwrap();

        assert_eq!(config.api.base_url, "https://env.example/api");
        assert_eq!(config.lists.page_size, 20);
        assert_eq!(config.lists.debounce_ms, 250);
    }

    #[test]
    fn test_mock_flag_parsing() {
        let loader = ConfigLoader::new();
        let config = loader
            .load_with(lookup_from(&[("TENDERDESK_MOCK", "yes"), ("TENDERDESK_API_URL", "")]))
            .unwrap();
        assert!(config.api.mock);
    }

    #[test]
    fn test_unparsable_numbers_are_ignored() {
        let config = ConfigLoader::new()
            .load_with(lookup_from(&[("TENDERDESK_PAGE_SIZE", "lots")]))
            .unwrap();
        assert_eq!(config.lists.page_size, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let loader = ConfigLoader::with_path("/definitely/not/here.toml");
        assert!(loader.load_with(lookup_from(&[])).is_err());
    }
}
