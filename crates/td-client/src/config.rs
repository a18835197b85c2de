//! Client configuration

use std::time::Duration;

/// Configuration for the TenderDesk client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the REST API
    pub base_url: String,

    /// Fixed per-request ceiling; exceeding it yields a timeout error, never a retry
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Serve requests from the in-memory fixture store instead of the network
    pub mock: bool,

    /// Default page size for list controllers
    pub page_size: u32,

    /// Search debounce window for list controllers
    pub debounce: Duration,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("TenderDesk/{}", env!("CARGO_PKG_VERSION")),
            mock: false,
            page_size: td_common::DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(500),
        }
    }

    /// Configuration for mock mode; the base URL is only used to resolve download links.
    pub fn mock() -> Self {
        Self {
            mock: true,
            ..Self::new("http://mock.local/api")
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000/api")
    }
}
