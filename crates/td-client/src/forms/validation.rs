//! Field-level validation primitives

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Validation failures keyed by field name, in the order they were found.
///
/// Only the first error per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.errors.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// The message shown in the toast.
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|(_, m)| m.as_str())
    }

    /// `Ok(value)` when nothing failed.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Record `message` if `value` is blank. Returns whether the value was present.
    pub fn require(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, message);
            false
        } else {
            true
        }
    }

    /// Record `message` if `value` is `None`.
    pub fn require_some<T>(&mut self, field: &str, value: Option<&T>, message: &str) -> bool {
        if value.is_none() {
            self.add(field, message);
            false
        } else {
            true
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize, message: &str) {
        if value.trim().chars().count() > max {
            self.add(field, message);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Loose email shape: something@something.tld, no whitespace
pub fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// Digits with optional leading +, spaces, dashes and parentheses
pub fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?\(?[0-9][0-9 ()\-]{5,19}$").expect("valid phone regex"))
}

/// Treat a blank string as absent.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required");
        errors.add("email", "Email is invalid");
        errors.add("name", "Name is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.first_message(), Some("Email is required"));
        assert_eq!(errors.to_string(), "email: Email is required; name: Name is required");
    }

    #[test]
    fn test_email_pattern() {
        assert!(email_pattern().is_match("buyer@ministry.gov.al"));
        assert!(!email_pattern().is_match("buyer@ministry"));
        assert!(!email_pattern().is_match("bu yer@ministry.al"));
        assert!(!email_pattern().is_match(""));
    }

    #[test]
    fn test_phone_pattern() {
        assert!(phone_pattern().is_match("+355 69 123 4567"));
        assert!(phone_pattern().is_match("(04) 222-333"));
        assert!(phone_pattern().is_match("+(355) 4 222 333"));
        assert!(!phone_pattern().is_match("((04) 222-333"));
        assert!(!phone_pattern().is_match("call me"));
        assert!(!phone_pattern().is_match("12"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FieldErrors::new().into_result(5), Ok(5));
        assert!(FieldErrors::single("x", "bad").into_result(5).is_err());
    }
}
