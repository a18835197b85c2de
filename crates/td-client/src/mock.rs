//! In-memory mock transport
//!
//! Answers API requests from a seeded record store so the console can run
//! without a backend. It behaves like the real API where the client can
//! tell the difference: bearer tokens are required outside `/auth`, lists
//! are filtered and paginated, unknown ids yield 404, uploaded documents are
//! stored and served back from `/uploads/...`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::error::ApiResult;
use crate::models::MAX_DOCUMENTS;
use crate::transport::{ApiRequest, ApiResponse, PartValue, RequestBody, Transport};

/// Token handed out by the mock login
pub const MOCK_TOKEN: &str = "mock-session-token";

/// Collections the mock serves
pub const COLLECTIONS: &[&str] = &[
    "tenders",
    "subscribers",
    "packages",
    "notice-types",
    "procedures",
    "categories",
    "contracting-authorities",
    "regions",
    "states",
    "contract-types",
];

#[derive(Debug, Default)]
struct Store {
    collections: HashMap<String, Vec<Value>>,
    uploads: HashMap<String, Vec<u8>>,
    next_id: u64,
    requests: Vec<(Method, String)>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn rows(&mut self, collection: &str) -> &mut Vec<Value> {
        self.collections.entry(collection.to_string()).or_default()
    }

    fn position(&self, collection: &str, id: &str) -> Option<usize> {
        self.collections
            .get(collection)?
            .iter()
            .position(|row| id_of(row).as_deref() == Some(id))
    }
}

/// Transport backed by an in-memory record store
#[derive(Debug, Default)]
pub struct MockTransport {
    store: Mutex<Store>,
}

fn id_of(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn ok(status: u16, data: Value) -> ApiResponse {
    ApiResponse::json(status, &json!({ "success": true, "data": data }))
}

fn fail(status: u16, message: &str) -> ApiResponse {
    ApiResponse::json(status, &json!({ "success": false, "message": message }))
}

/// Request path relative to the API root, without query string.
fn route_path(raw: &str) -> String {
    let mut path = raw.split('?').next().unwrap_or(raw);
    if let Some(rest) = path
        .strip_prefix("http://")
        .or_else(|| path.strip_prefix("https://"))
    {
        path = rest.find('/').map(|i| &rest[i..]).unwrap_or("/");
    }
    let path = path.strip_prefix("/api").unwrap_or(path);
    format!("/{}", path.trim_matches('/'))
}

impl MockTransport {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with demo records for every collection
    pub fn with_fixtures() -> Self {
        let mock = Self::new();
        for (collection, rows) in fixtures() {
            mock.seed(collection, rows);
        }
        let mut store = mock.store.lock();
        store.uploads.insert(
            "/uploads/tenders/road-rehabilitation.pdf".to_string(),
            b"%PDF-1.4\n% road rehabilitation tender dossier\n".to_vec(),
        );
        store.uploads.insert(
            "/uploads/tenders/hospital-beds.pdf".to_string(),
            b"%PDF-1.4\n% hospital beds technical specification\n".to_vec(),
        );
        drop(store);
        mock
    }

    /// Replace a collection's records. Numeric ids advance the id counter.
    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        let mut store = self.store.lock();
        let max_id = rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0);
        store.next_id = store.next_id.max(max_id);
        store.collections.insert(collection.to_string(), rows);
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.store
            .lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn upload(&self, reference: &str) -> Option<Vec<u8>> {
        self.store.lock().uploads.get(reference).cloned()
    }

    /// Every request received, as `(method, path)`.
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.store.lock().requests.clone()
    }

    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        self.store
            .lock()
            .requests
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    fn handle(&self, request: ApiRequest) -> ApiResponse {
        let path = route_path(&request.path);
        let mut store = self.store.lock();
        store.requests.push((request.method.clone(), path.clone()));

        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        if segments.first() == Some(&"auth") {
            return auth_route(&request, &segments);
        }
        if request.bearer.as_deref().map_or(true, str::is_empty) {
            return fail(401, "Authentication required");
        }
        if segments.first() == Some(&"uploads") {
            return match store.uploads.get(&path) {
                Some(bytes) => ApiResponse {
                    status: 200,
                    content_type: mime_guess::from_path(&path).first_raw().map(str::to_string),
                    body: bytes.clone(),
                },
                None => fail(404, "File not found"),
            };
        }

        let collection = segments[0];
        if !COLLECTIONS.contains(&collection) {
            return fail(404, "Route not found");
        }

        match (&request.method, segments.as_slice()) {
            (&Method::GET, [_]) => list(&mut store, collection, &request.query),
            (&Method::POST, [_]) => create(&mut store, collection, request.body),
            (&Method::GET, [_, id]) => match store.position(collection, id) {
                Some(i) => ok(200, store.rows(collection)[i].clone()),
                None => not_found(collection),
            },
            (&Method::PUT, [_, id]) | (&Method::PATCH, [_, id]) => {
                update(&mut store, collection, id, request.body)
            }
            (&Method::DELETE, [_, id]) => match store.position(collection, id) {
                Some(i) => {
                    store.rows(collection).remove(i);
                    ApiResponse::json(200, &json!({ "success": true, "message": "Deleted successfully" }))
                }
                None => not_found(collection),
            },
            (&Method::PATCH, ["subscribers", id, "extend"]) => extend(&mut store, id, request.body),
            _ => fail(404, "Route not found"),
        }
    }
}

fn not_found(collection: &str) -> ApiResponse {
    debug!(collection, "Mock record not found");
    fail(404, "Record not found")
}

fn auth_route(request: &ApiRequest, segments: &[&str]) -> ApiResponse {
    match (&request.method, segments) {
        (&Method::POST, ["auth", "login"]) => {
            let body = match &request.body {
                RequestBody::Json(value) => value.clone(),
                _ => Value::Null,
            };
            let username = body.get("username").and_then(Value::as_str).unwrap_or("");
            let password = body.get("password").and_then(Value::as_str).unwrap_or("");
            if username.trim().is_empty() || password.is_empty() {
                return fail(401, "Invalid username or password");
            }
            ok(
                200,
                json!({
                    "token": MOCK_TOKEN,
                    "user": {
                        "id": 1,
                        "username": username.trim(),
                        "email": format!("{}@tenderdesk.local", username.trim()),
                        "role": "admin"
                    }
                }),
            )
        }
        (&Method::POST, ["auth", "logout"]) => ok(200, Value::Null),
        _ => fail(404, "Route not found"),
    }
}

fn matches_search(row: &Value, needle: &str) -> bool {
    const SEARCHABLE: &[&str] = &[
        "title",
        "name",
        "procurementNumber",
        "username",
        "email",
        "company",
        "description",
    ];
    let needle = needle.to_lowercase();
    SEARCHABLE.iter().any(|key| {
        row.get(*key)
            .and_then(Value::as_str)
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    })
}

fn list(store: &mut Store, collection: &str, query: &[(String, String)]) -> ApiResponse {
    let mut page = 1u64;
    let mut limit = 0u64;
    let mut search = None;
    let mut filters = Vec::new();
    for (key, value) in query {
        match key.as_str() {
            "page" => page = value.parse().unwrap_or(1).max(1),
            "limit" => limit = value.parse().unwrap_or(0),
            "search" => search = Some(value.as_str()),
            _ => filters.push((key.as_str(), value.as_str())),
        }
    }

    let matching: Vec<Value> = store
        .rows(collection)
        .iter()
        .filter(|row| search.map_or(true, |s| matches_search(row, s)))
        .filter(|row| {
            filters
                .iter()
                .all(|(key, value)| row.get(*key).and_then(text_of).as_deref() == Some(*value))
        })
        .cloned()
        .collect();

    let total = matching.len() as u64;
    let (rows, limit) = if limit == 0 {
        (matching, total)
    } else {
        let start = ((page - 1) * limit) as usize;
        let rows = matching.into_iter().skip(start).take(limit as usize).collect();
        (rows, limit)
    };
    let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };

    ApiResponse::json(
        200,
        &json!({
            "success": true,
            "data": rows,
            "pagination": {
                "total": total,
                "page": page,
                "limit": limit,
                "totalPages": total_pages
            }
        }),
    )
}

/// Flatten a request body into record fields. Uploaded files are stored and
/// replaced by their reference.
fn body_fields(store: &mut Store, collection: &str, body: RequestBody) -> Map<String, Value> {
    match body {
        RequestBody::Empty => Map::new(),
        RequestBody::Json(Value::Object(map)) => map,
        RequestBody::Json(_) => Map::new(),
        RequestBody::Multipart(parts) => {
            let mut fields = Map::new();
            for part in parts {
                let value = match part.value {
                    PartValue::Text(text) => Value::String(text),
                    PartValue::File {
                        file_name, bytes, ..
                    } => {
                        let reference =
                            format!("/uploads/{collection}/{}-{file_name}", store.next_id() + 1000);
                        store.uploads.insert(reference.clone(), bytes);
                        Value::String(reference)
                    }
                };
                fields.insert(part.name, value);
            }
            fields
        }
    }
}

/// Derived columns the real API joins in.
fn decorate(store: &Store, collection: &str, row: &mut Map<String, Value>) {
    if collection == "subscribers" {
        row.remove("password");
        let package_name = row
            .get("packageId")
            .and_then(text_of)
            .and_then(|package_id| {
                store
                    .collections
                    .get("packages")?
                    .iter()
                    .find(|p| id_of(p).as_deref() == Some(package_id.as_str()))?
                    .get("name")
                    .cloned()
            });
        if let Some(name) = package_name {
            row.insert("packageName".to_string(), name);
        }
    }
}

fn create(store: &mut Store, collection: &str, body: RequestBody) -> ApiResponse {
    let mut fields = body_fields(store, collection, body);
    let id = store.next_id();
    fields.insert("id".to_string(), json!(id));
    fields.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
    decorate(store, collection, &mut fields);

    let row = Value::Object(fields);
    store.rows(collection).push(row.clone());
    debug!(collection, id, "Mock record created");
    ok(201, row)
}

fn update(store: &mut Store, collection: &str, id: &str, body: RequestBody) -> ApiResponse {
    let Some(index) = store.position(collection, id) else {
        return not_found(collection);
    };
    let replaces_documents = matches!(body, RequestBody::Multipart(_));
    let fields = body_fields(store, collection, body);

    let Some(Value::Object(mut row)) = store.collections.get(collection).map(|rows| rows[index].clone())
    else {
        return not_found(collection);
    };
    if replaces_documents {
        for slot in 1..=MAX_DOCUMENTS {
            row.remove(&format!("file{slot}"));
        }
    }
    for (key, value) in fields {
        if key != "id" {
            row.insert(key, value);
        }
    }
    row.insert("updatedAt".to_string(), json!(Utc::now().to_rfc3339()));
    decorate(store, collection, &mut row);

    let row = Value::Object(row);
    store.rows(collection)[index] = row.clone();
    ok(200, row)
}

fn extend(store: &mut Store, id: &str, body: RequestBody) -> ApiResponse {
    let Some(index) = store.position("subscribers", id) else {
        return not_found("subscribers");
    };
    let RequestBody::Json(body) = body else {
        return fail(400, "expiryDate is required");
    };
    let Some(expiry) = body.get("expiryDate").cloned() else {
        return fail(400, "expiryDate is required");
    };
    let rows = store.rows("subscribers");
    if let Value::Object(row) = &mut rows[index] {
        row.insert("expiryDate".to_string(), expiry);
    }
    ok(200, rows[index].clone())
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        Ok(self.handle(request))
    }
}

fn named(rows: &[(u64, &str)]) -> Vec<Value> {
    rows.iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect()
}

fn fixtures() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        (
            "categories",
            named(&[(1, "Works"), (2, "Goods"), (3, "Services"), (4, "Consultancy")]),
        ),
        (
            "procedures",
            named(&[(1, "Open procedure"), (2, "Restricted procedure"), (3, "Negotiated procedure")]),
        ),
        (
            "notice-types",
            named(&[(1, "Contract notice"), (2, "Prior information notice"), (3, "Award notice")]),
        ),
        (
            "contract-types",
            named(&[(1, "Public works"), (2, "Supply"), (3, "Service")]),
        ),
        ("regions", named(&[(1, "Tirana"), (2, "Durrës"), (3, "Shkodër")])),
        ("states", named(&[(1, "Albania"), (2, "Kosovo"), (3, "North Macedonia")])),
        (
            "contracting-authorities",
            vec![
                json!({ "id": 1, "name": "Ministry of Health", "address": "Bulevardi Bajram Curri", "email": "procurement@health.gov.al", "regionId": 1 }),
                json!({ "id": 2, "name": "Albanian Road Authority", "email": "tenders@arrsh.gov.al", "regionId": 1 }),
            ],
        ),
        (
            "packages",
            vec![
                json!({ "id": 1, "name": "Monthly", "price": 15.0, "durationDays": 30, "description": "Full access for one month" }),
                json!({ "id": 2, "name": "Annual", "price": 150.0, "durationDays": 365, "description": "Full access for one year" }),
            ],
        ),
        (
            "tenders",
            vec![
                json!({
                    "id": 1, "title": "Road rehabilitation Tirana-Elbasan", "procurementNumber": "REF-2026-001",
                    "publicationDate": "2026-01-10T08:00:00Z", "expiryDate": "2026-02-10T12:00:00Z",
                    "categoryId": 1, "subCategory": "Road infrastructure", "procedureId": 1, "noticeTypeId": 1,
                    "contractTypeId": 1, "regionId": 1, "stateId": 1, "contractingAuthorityId": 2,
                    "price": 1250000.0, "file1": "/uploads/tenders/road-rehabilitation.pdf"
                }),
                json!({
                    "id": 2, "title": "Supply of hospital beds", "procurementNumber": "REF-2026-002",
                    "publicationDate": "2026-01-15T08:00:00Z", "expiryDate": "2026-03-01T12:00:00Z",
                    "categoryId": 2, "subCategory": "Medical equipment", "procedureId": 1, "noticeTypeId": 1,
                    "contractTypeId": 2, "regionId": 1, "stateId": 1, "contractingAuthorityId": 1,
                    "price": 86000.0, "file1": "/uploads/tenders/hospital-beds.pdf"
                }),
            ],
        ),
        (
            "subscribers",
            vec![
                json!({
                    "id": 1, "username": "acme", "email": "office@acme.al", "isActive": true,
                    "packageId": 2, "packageName": "Annual", "expiryDate": "2026-12-31",
                    "company": "Acme Construction", "phone": "+355 69 000 1111", "fiscalNumber": "L12345678A"
                }),
                json!({
                    "id": 2, "username": "medsupply", "email": "info@medsupply.al", "isActive": false,
                    "packageId": 1, "packageName": "Monthly", "expiryDate": "2026-02-01"
                }),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed(method: Method, path: &str) -> ApiRequest {
        let mut request = ApiRequest::new(method, path);
        request.bearer = Some(MOCK_TOKEN.to_string());
        request
    }

    #[tokio::test]
    async fn test_requires_bearer() {
        let mock = MockTransport::with_fixtures();
        let response = mock.send(ApiRequest::new(Method::GET, "/tenders")).await.unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn test_list_paginates_and_searches() {
        let mock = MockTransport::with_fixtures();
        let request = authed(Method::GET, "/tenders").with_query(vec![
            ("page".into(), "1".into()),
            ("limit".into(), "1".into()),
            ("search".into(), "hospital".into()),
        ]);
        let body = mock.send(request).await.unwrap().json_body();
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["procurementNumber"], "REF-2026-002");
    }

    #[tokio::test]
    async fn test_missing_id_is_404() {
        let mock = MockTransport::with_fixtures();
        let response = mock.send(authed(Method::DELETE, "/regions/99")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_route_path() {
        assert_eq!(route_path("http://mock.local/api/uploads/a.pdf"), "/uploads/a.pdf");
        assert_eq!(route_path("/tenders?page=2"), "/tenders");
        assert_eq!(route_path("uploads/x.pdf"), "/uploads/x.pdf");
    }
}
