//! Terminal front end: toasts on stderr, login hints and the session file

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use td_client::auth::LOGIN_ROUTE;
use td_client::invoice::Issuer;
use td_client::{
    AdminApi, ApiClient, ClientConfig, FileSessionStore, ListController, Navigator, Notifier,
    Resource, ResourceService, SessionAuth, Toast, ToastLevel,
};
use td_config::AppConfig;

/// Prints toasts to stderr and remembers whether an error was shown.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    errors: AtomicUsize,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// An error toast has already told the user what went wrong.
    pub fn has_reported_error(&self) -> bool {
        self.errors.load(Ordering::Relaxed) > 0
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        let tag = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Info => "info",
            ToastLevel::Error => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                "error"
            }
        };
        eprintln!("{}: {}", tag, toast.message);
    }
}

/// Turns the login redirect into a hint.
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: &str) {
        if route == LOGIN_ROUTE {
            eprintln!("Not signed in or the session expired. Run `td-admin login` first.");
        } else {
            debug!(route, "Ignoring navigation");
        }
    }
}

/// Session file location. Mock mode keeps its own file so a fixture token
/// never reaches the real API.
pub fn session_path(config: &AppConfig) -> PathBuf {
    let configured = config.session.path.trim();
    if !configured.is_empty() {
        return PathBuf::from(configured);
    }
    let file = if config.api.mock {
        "session-mock.json"
    } else {
        "session.json"
    };
    dirs::cache_dir()
        .map(|dir| dir.join("tenderdesk"))
        .unwrap_or_else(|| PathBuf::from(".tenderdesk"))
        .join(file)
}

pub fn client_config(config: &AppConfig) -> ClientConfig {
    ClientConfig::new(config.api.base_url.trim_end_matches('/'))
        .with_timeout(Duration::from_millis(config.api.timeout_ms))
        .with_user_agent(config.api.user_agent.clone())
        .with_mock(config.api.mock)
        .with_page_size(config.lists.page_size)
        .with_debounce(Duration::from_millis(config.lists.debounce_ms))
}

pub fn issuer(config: &AppConfig) -> Issuer {
    let invoice = &config.invoice;
    Issuer {
        name: invoice.issuer_name.clone(),
        address: invoice.issuer_address.clone(),
        fiscal_number: invoice.issuer_fiscal_number.clone(),
        email: invoice.issuer_email.clone(),
        phone: invoice.issuer_phone.clone(),
        bank_account: invoice.bank_account.clone(),
    }
}

/// Everything a command needs.
pub struct Console {
    pub api: AdminApi,
    pub notifier: Arc<ConsoleNotifier>,
    pub config: AppConfig,
}

impl Console {
    pub fn open(config: AppConfig, notifier: Arc<ConsoleNotifier>) -> Result<Self> {
        let path = session_path(&config);
        let store = FileSessionStore::open(&path)
            .with_context(|| format!("Failed to open session file {}", path.display()))?;
        debug!(path = %path.display(), mock = config.api.mock, "Session store opened");

        let session = SessionAuth::new(Arc::new(store), Arc::new(ConsoleNavigator));
        let client = ApiClient::new(client_config(&config), Arc::new(session.clone()))
            .context("Failed to create API client")?;

        Ok(Self {
            api: AdminApi::new(client, session),
            notifier,
            config,
        })
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn list_of<R: Resource>(&self, service: &ResourceService<R>) -> ListController<R::Entity> {
        ListController::for_service(service.clone(), self.notifier.clone())
    }
}

/// Ask a yes/no question on stderr; anything but y/yes is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Read one line from stdin after a prompt on stderr.
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    eprint!("{}: ", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_session_path_wins() {
        let mut config = AppConfig::default();
        config.session.path = "/tmp/td/session.json".to_string();
        assert_eq!(session_path(&config), PathBuf::from("/tmp/td/session.json"));
    }

    #[test]
    fn test_mock_mode_uses_separate_session_file() {
        let mut config = AppConfig::default();
        config.api.mock = true;
        assert!(session_path(&config).ends_with("session-mock.json"));
        config.api.mock = false;
        assert!(session_path(&config).ends_with("session.json"));
    }

    #[test]
    fn test_notifier_tracks_errors() {
        let notifier = ConsoleNotifier::new();
        notifier.success("Region created successfully");
        assert!(!notifier.has_reported_error());
        notifier.error("Record not found");
        assert!(notifier.has_reported_error());
    }

    #[test]
    fn test_client_config_from_app_config() {
        let mut config = AppConfig::default();
        config.api.base_url = "https://tenders.example/api/".to_string();
        config.api.mock = true;
        config.lists.page_size = 25;

        let client = client_config(&config);
        assert_eq!(client.base_url, "https://tenders.example/api");
        assert!(client.mock);
        assert_eq!(client.page_size, 25);
        assert_eq!(client.timeout, Duration::from_secs(30));
    }
}
