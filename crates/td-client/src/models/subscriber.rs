//! Subscriber (client account) and subscription package entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use td_common::lenient;

/// A subscriber: account, subscription and contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, deserialize_with = "lenient::bool_flag", alias = "active")]
    pub is_active: bool,

    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub package_id: Option<String>,

    #[serde(default)]
    pub package_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::timestamp_opt")]
    pub expiry_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub fiscal_number: Option<String>,

    #[serde(default, deserialize_with = "lenient::timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    /// Name printed on invoices: the company, or the username when no company is set.
    pub fn display_company(&self) -> &str {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.username)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }

    /// Whole days until expiry; negative once expired.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expiry_date.map(|expiry| (expiry - now).num_days())
    }
}

/// A subscription package sold to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::u32_opt", alias = "duration")]
    pub duration_days: Option<u32>,

    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_company_falls_back_to_username() {
        let mut sub: Subscriber = serde_json::from_value(json!({
            "id": 5, "username": "acme", "email": "ops@acme.test", "isActive": 1, "company": "  "
        }))
        .unwrap();
        assert!(sub.is_active);
        assert_eq!(sub.display_company(), "acme");

        sub.company = Some("Acme Ltd".into());
        assert_eq!(sub.display_company(), "Acme Ltd");
    }

    #[test]
    fn test_days_remaining() {
        let sub: Subscriber = serde_json::from_value(json!({
            "id": 1, "username": "u", "expiryDate": "2026-03-11"
        }))
        .unwrap();
        let now = lenient::parse_timestamp("2026-03-01").unwrap();
        assert_eq!(sub.days_remaining(now), Some(10));
        assert!(!sub.is_expired(now));
    }

    #[test]
    fn test_package_lenient_numbers() {
        let pkg: Package = serde_json::from_value(json!({
            "id": "p1", "name": "Annual", "price": "240.00", "duration": 365
        }))
        .unwrap();
        assert_eq!(pkg.price, Some(240.0));
        assert_eq!(pkg.duration_days, Some(365));
    }
}
