//! Shared wire types for TenderDesk
//!
//! Pagination envelopes, list queries and the lenient deserializers used for
//! backend fields that arrive as either numbers or strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod logging;

/// Default page size used by every list page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ============================================================================
// Lenient deserializers
// ============================================================================

/// Deserializers for fields the backend sends inconsistently typed.
pub mod lenient {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNum {
        Int(i64),
        Float(f64),
        Str(String),
    }

    /// Ids arrive as `12` or `"12"`; both become `"12"`.
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrNum::deserialize(deserializer)? {
            StringOrNum::Int(n) => Ok(n.to_string()),
            StringOrNum::Float(f) => Ok(f.to_string()),
            StringOrNum::Str(s) => Ok(s),
        }
    }

    /// Optional id; empty strings count as absent.
    pub fn id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Int(n)) => Ok(Some(n.to_string())),
            Some(StringOrNum::Float(f)) => Ok(Some(f.to_string())),
            Some(StringOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNum::Str(s)) => Ok(Some(s)),
            None => Ok(None),
        }
    }

    pub fn u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Int(n)) => u32::try_from(n).map(Some).map_err(de::Error::custom),
            Some(StringOrNum::Float(f)) if f >= 0.0 => Ok(Some(f as u32)),
            Some(StringOrNum::Float(f)) => Err(de::Error::custom(format!("negative count {f}"))),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    pub fn u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Int(n)) => u64::try_from(n).map(Some).map_err(de::Error::custom),
            Some(StringOrNum::Float(f)) if f >= 0.0 => Ok(Some(f as u64)),
            Some(StringOrNum::Float(f)) => Err(de::Error::custom(format!("negative count {f}"))),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    /// Prices come back as `1200`, `1200.5` or `"1200.50"`.
    pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Int(n)) => Ok(Some(n as f64)),
            Some(StringOrNum::Float(f)) => Ok(Some(f)),
            Some(StringOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    /// Booleans that may be sent as `true`, `1` or `"true"`.
    pub fn bool_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(i64),
            Str(String),
        }

        match Option::<Flag>::deserialize(deserializer)? {
            Some(Flag::Bool(b)) => Ok(b),
            Some(Flag::Int(n)) => Ok(n != 0),
            Some(Flag::Str(s)) => Ok(matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes")),
            None => Ok(false),
        }
    }

    /// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (taken as midnight UTC).
    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {s}"))),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// One page of a list endpoint, after envelope normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self {
            data,
            total,
            page: page.max(1),
            limit,
            total_pages,
        }
    }

    /// Build a single page out of a bare array that carried no pagination metadata.
    pub fn from_items(data: Vec<T>, page: u32, limit: u32) -> Self {
        let total = data.len() as u64;
        let limit = if limit == 0 { data.len() as u32 } else { limit };
        Self::new(data, page, limit, total)
    }

    pub fn empty(page: u32, limit: u32) -> Self {
        Self::new(Vec::new(), page, limit, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Parameters of a list request: page, page size, free-text search and filters.
///
/// Equality is used by list controllers to short-circuit duplicate fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.set_search(search);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(key, value);
        self
    }

    /// Set the search text; blank text clears it.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        let trimmed = search.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Set a filter; a blank value removes it.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, value.trim().to_string());
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "lenient::id")]
        id: String,
        #[serde(default, deserialize_with = "lenient::f64_opt")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "lenient::bool_flag")]
        active: bool,
        #[serde(default, deserialize_with = "lenient::timestamp_opt")]
        expires: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn test_page_total_pages() {
        let page: Page<u8> = Page::new(vec![], 1, 10, 21);
        assert_eq!(page.total_pages, 3);

        let page: Page<u8> = Page::new(vec![], 1, 10, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_page_from_bare_items() {
        let page = Page::from_items(vec![1, 2, 3], 1, 0);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_query_pairs_are_stable() {
        let query = ListQuery::new(2, 25)
            .with_filter("status", "open")
            .with_filter("category", "4")
            .with_search("  road works ");

        let pairs = query.to_pairs();
        assert_eq!(pairs[0], ("page".to_string(), "2".to_string()));
        assert_eq!(pairs[2], ("search".to_string(), "road works".to_string()));
        assert_eq!(pairs[3].0, "category");
        assert_eq!(pairs[4].0, "status");
    }

    #[test]
    fn test_blank_filter_removes_key() {
        let mut query = ListQuery::default().with_filter("status", "open");
        query.set_filter("status", " ");
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_lenient_fields() {
        let row: Row = serde_json::from_str(
            r#"{"id": 42, "price": "1200.50", "active": 1, "expires": "2026-03-01"}"#,
        )
        .unwrap();
        assert_eq!(row.id, "42");
        assert_eq!(row.price, Some(1200.5));
        assert!(row.active);
        assert_eq!(row.expires.unwrap().to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }
}
