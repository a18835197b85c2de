//! Response envelope normalization
//!
//! The backend answers in several shapes depending on the endpoint:
//!
//! - `{"success": true, "data": [...], "pagination": {...}}`
//! - `{"data": [...], "total": 40, "page": 2, "totalPages": 4}`
//! - `{"success": true, "data": {"data": [...], "pagination": {...}}}`
//! - a bare array or a bare object
//!
//! Every service goes through this module so the rest of the client only ever
//! sees a [`Page`] or a plain entity.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use td_common::{lenient, ListQuery, Page};

use crate::error::{ApiError, ApiResult};

/// Keys that may hold the row array inside a data object.
const ROW_KEYS: &[&str] = &["data", "items", "rows", "results"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    #[serde(default, deserialize_with = "lenient::u64_opt", alias = "totalItems", alias = "count")]
    total: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u32_opt", alias = "currentPage")]
    page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::u32_opt", alias = "pageSize", alias = "perPage")]
    limit: Option<u32>,
    #[serde(default, deserialize_with = "lenient::u32_opt", alias = "pages")]
    total_pages: Option<u32>,
}

impl PageMeta {
    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        let source = match map.get("pagination").or_else(|| map.get("meta")) {
            Some(Value::Object(inner)) => inner,
            _ => map,
        };
        let meta: PageMeta = serde_json::from_value(Value::Object(source.clone())).ok()?;
        if meta.total.is_none() && meta.total_pages.is_none() {
            return None;
        }
        Some(meta)
    }
}

/// Reject `{success: false}` envelopes that arrived with a 2xx status.
fn check_success(body: &Value) -> ApiResult<()> {
    if let Some(false) = body.get("success").and_then(Value::as_bool) {
        return Err(ApiError::rejected(body.clone()));
    }
    Ok(())
}

/// Strip the envelope off a single-entity response.
pub fn unwrap_data(body: Value) -> ApiResult<Value> {
    check_success(&body)?;
    match body {
        Value::Object(mut map) if map.contains_key("data") && is_envelope(&map) => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

/// An object is an envelope if it carries `data` plus only envelope keys.
fn is_envelope(map: &Map<String, Value>) -> bool {
    map.keys().all(|key| {
        matches!(
            key.as_str(),
            "data" | "success" | "message" | "pagination" | "meta" | "total" | "page"
                | "limit" | "totalPages" | "total_pages" | "count" | "status"
        )
    })
}

/// Decode a single entity, whatever envelope it came in.
pub fn normalize_one<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    let data = unwrap_data(body)?;
    serde_json::from_value(data).map_err(ApiError::decode)
}

/// Decode a list response into a [`Page`], filling missing pagination
/// metadata from the request.
pub fn normalize_list<T: DeserializeOwned>(body: Value, query: &ListQuery) -> ApiResult<Page<T>> {
    check_success(&body)?;

    let (rows, meta) = split_rows(body)?;
    let items = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(ApiError::decode)?;

    Ok(match meta {
        Some(meta) => {
            let limit = meta.limit.unwrap_or(query.limit);
            let page = meta.page.unwrap_or(query.page);
            let total = meta.total.unwrap_or_else(|| {
                // only a page count was given; best estimate of the total
                meta.total_pages.unwrap_or(0) as u64 * limit as u64
            });
            let mut result = Page::new(items, page, limit, total);
            if let Some(total_pages) = meta.total_pages {
                result.total_pages = total_pages;
            }
            result
        }
        None => Page::from_items(items, query.page, query.limit),
    })
}

fn split_rows(body: Value) -> ApiResult<(Vec<Value>, Option<PageMeta>)> {
    match body {
        Value::Array(rows) => Ok((rows, None)),
        Value::Object(map) => {
            let outer_meta = PageMeta::from_object(&map);
            for key in ROW_KEYS {
                match map.get(*key) {
                    Some(Value::Array(rows)) => return Ok((rows.clone(), outer_meta)),
                    Some(Value::Object(inner)) => {
                        let (rows, inner_meta) = split_rows(Value::Object(inner.clone()))?;
                        return Ok((rows, inner_meta.or(outer_meta)));
                    }
                    _ => {}
                }
            }
            Err(ApiError::decode("list response contains no row array"))
        }
        Value::Null => Ok((Vec::new(), None)),
        other => Err(ApiError::decode(format!("unexpected list response: {other}"))),
    }
}
