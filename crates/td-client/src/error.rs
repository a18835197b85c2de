//! Error types for the TenderDesk client
//!
//! Every failed request is normalized into an [`ApiError`] carrying the
//! message, the HTTP status (absent for network and timeout failures) and the
//! decoded response body. Services return `ApiError` unchanged; higher layers
//! wrap it in [`Error`] together with validation and I/O failures.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::forms::FieldErrors;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for raw API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Coarse, status-driven classification of API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 400
    Validation,
    /// 401, session expired
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 422
    Unprocessable,
    /// 5xx
    Server,
    /// Request exceeded the client timeout
    Timeout,
    /// No response at all (DNS, refused connection, TLS)
    Network,
    /// Response arrived but could not be decoded
    Decode,
    Other,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Unprocessable,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Invalid request",
            Self::Unauthorized => "Your session has expired. Please log in again.",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::NotFound => "The requested resource was not found",
            Self::Conflict => "This record conflicts with an existing one",
            Self::Unprocessable => "The submitted data is invalid",
            Self::Server => "Server error. Please try again later.",
            Self::Timeout => "Request timed out",
            Self::Network => "Network error: unable to reach the server",
            Self::Decode => "Unexpected response from the server",
            Self::Other => "Request failed",
        }
    }
}

/// Normalized API error: `{message, status, data}` plus its classification.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
    pub kind: ErrorKind,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            data: None,
            kind,
        }
    }

    /// Build an error from a non-success status and its (possibly empty) body.
    ///
    /// The message is taken from the body's `message` or `error` field, falling
    /// back to a per-status default.
    pub fn from_status(status: u16, data: Option<Value>) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = data
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| kind.default_message().to_string());
        Self {
            message,
            status: Some(status),
            data,
            kind,
        }
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, ErrorKind::Timeout.default_message())
    }

    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Network,
            format!("{}: {}", ErrorKind::Network.default_message(), detail),
        )
    }

    pub fn decode(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Decode,
            format!("{}: {}", ErrorKind::Decode.default_message(), detail),
        )
    }

    /// A `{success: false}` envelope delivered with a 2xx status.
    pub fn rejected(data: Value) -> Self {
        let message = body_message(&data).unwrap_or_else(|| "Request was rejected".to_string());
        Self {
            message,
            status: None,
            data: Some(data),
            kind: ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Unauthorized => ErrorKind::Unauthorized.default_message().to_string(),
            ErrorKind::Server if self.message.is_empty() => {
                ErrorKind::Server.default_message().to_string()
            }
            _ if self.message.is_empty() => self.kind.default_message().to_string(),
            _ => self.message.clone(),
        }
    }
}

/// Pull a human-readable message out of an error body.
fn body_message(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => ["message", "error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Object(_) => body_message(v),
                _ => None,
            })
            .or_else(|| {
                // express-validator style: {"errors": [{"msg": "..."}]}
                map.get("errors")
                    .and_then(Value::as_array)
                    .and_then(|errors| errors.first())
                    .and_then(|first| {
                        first
                            .get("msg")
                            .or_else(|| first.get("message"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
            }),
        _ => None,
    }
}

/// Error types for the TenderDesk client
#[derive(Error, Debug)]
pub enum Error {
    /// The remote API rejected or failed the request
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client-side form validation failed; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invoice rendering failed
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The API error behind this failure, if any.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_from_body() {
        let err = ApiError::from_status(409, Some(json!({"success": false, "message": "Procurement number already exists"})));
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.status, Some(409));
        assert_eq!(err.message, "Procurement number already exists");
    }

    #[test]
    fn test_default_message_when_body_empty() {
        let err = ApiError::from_status(404, None);
        assert!(err.is_not_found());
        assert_eq!(err.message, "The requested resource was not found");
    }

    #[test]
    fn test_validator_style_errors() {
        let body = json!({"errors": [{"msg": "Email is invalid", "param": "email"}]});
        let err = ApiError::from_status(422, Some(body));
        assert_eq!(err.kind, ErrorKind::Unprocessable);
        assert_eq!(err.message, "Email is invalid");
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Other);
    }

    #[test]
    fn test_unauthorized_user_message_is_fixed() {
        let err = ApiError::from_status(401, Some(json!({"message": "jwt expired"})));
        assert_eq!(err.message, "jwt expired");
        assert_eq!(err.user_message(), "Your session has expired. Please log in again.");
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err = ApiError::timeout();
        assert!(err.is_timeout());
        assert_eq!(err.status, None);
    }
}
