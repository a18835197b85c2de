//! User notifications (toasts)

use parking_lot::Mutex;
use std::fmt::Debug;
use tracing::debug;

use crate::error::{ApiError, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast {
            level: ToastLevel::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Toast {
            level: ToastLevel::Error,
            message: message.to_string(),
        });
    }

    fn info(&self, message: &str) {
        self.notify(Toast {
            level: ToastLevel::Info,
            message: message.to_string(),
        });
    }

    /// Error toast for a failed request. Timeouts are not toasted.
    fn report(&self, err: &ApiError) {
        if err.is_timeout() {
            debug!("Suppressed timeout toast");
            return;
        }
        self.error(&err.user_message());
    }

    /// Error toast for any client failure.
    fn report_error(&self, err: &Error) {
        match err {
            Error::Api(api) => self.report(api),
            Error::Validation(errors) => {
                self.error(errors.first_message().unwrap_or("Please correct the highlighted fields"))
            }
            other => self.error(&other.to_string()),
        }
    }
}

/// Keeps every toast; used by tests and by the console to print at the end.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    pub fn messages(&self, level: ToastLevel) -> Vec<String> {
        self.toasts
            .lock()
            .iter()
            .filter(|t| t.level == level)
            .map(|t| t.message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.toasts.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _toast: Toast) {}
}
