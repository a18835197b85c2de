//! HTTP client tests against a wiremock server
//!
//! Tests for:
//! - Bearer token attachment and the 401 logout/redirect flow
//! - Error normalization (status, body message, timeout)
//! - Envelope shapes on list endpoints
//! - Multipart tender submission and document downloads
//! - No bearer token on foreign document hosts
//! - Subscriber expiry extension
//! - Delete of an already-deleted record

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use td_client::auth::{LOGIN_ROUTE, TOKEN_KEY, USER_KEY};
use td_client::forms::subscriber::submit_extension;
use td_client::forms::{DocumentUpload, ExtendExpiryForm, TenderForm};
use td_client::{
    submit_create, AdminApi, ApiClient, ClientConfig, ErrorKind, ListController, ListQuery,
    RecordingNavigator, RecordingNotifier, SessionAuth, SessionUser, ToastLevel,
};
use td_common::lenient::parse_timestamp;

struct Harness {
    api: AdminApi,
    session: SessionAuth,
    navigator: Arc<RecordingNavigator>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(server: &MockServer, timeout: Duration) -> Harness {
    let (session, navigator) = SessionAuth::in_memory();
    let config = ClientConfig::new(format!("{}/api", server.uri())).with_timeout(timeout);
    let client = ApiClient::new(config, Arc::new(session.clone())).unwrap();
    Harness {
        api: AdminApi::new(client, session.clone()),
        session,
        navigator,
        notifier: Arc::new(RecordingNotifier::new()),
    }
}

fn logged_in(server: &MockServer) -> Harness {
    let h = harness(server, Duration::from_secs(5));
    let user = SessionUser {
        id: "1".into(),
        username: "admin".into(),
        email: None,
        role: Some("admin".into()),
    };
    h.session.save("abc123", &user).unwrap();
    h
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/regions"))
        .and(header("Authorization", "Bearer abc123"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 1, "name": "Tirana"}],
            "pagination": {"total": 1, "page": 1, "limit": 10, "totalPages": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let page = h.api.regions.list(&ListQuery::new(1, 10)).await.unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].name, "Tirana");
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let err = h.api.tenders.list(&ListQuery::new(1, 10)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.status, Some(401));
    assert!(h.session.store().get(TOKEN_KEY).is_none());
    assert!(h.session.store().get(USER_KEY).is_none());
    assert_eq!(h.navigator.last().as_deref(), Some(LOGIN_ROUTE));
}

#[tokio::test]
async fn test_login_sends_no_bearer_and_stores_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(|req: &Request| !req.headers.contains_key("authorization"))
        .and(body_partial_json(json!({"username": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "fresh-token", "user": {"id": 7, "username": "admin"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // a stale token must not leak onto the auth endpoint
    let h = logged_in(&server);
    let user = h.api.auth.login("admin", "secret").await.unwrap();

    assert_eq!(user.id, "7");
    assert_eq!(h.session.store().get(TOKEN_KEY).as_deref(), Some("fresh-token"));
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_failed_login_does_not_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let h = harness(&server, Duration::from_secs(5));
    let err = h.api.auth.login("admin", "wrong").await.unwrap_err();

    assert_eq!(err.api().map(|e| e.message.as_str()), Some("Invalid credentials"));
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_error_message_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/subscribers/3"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Database unavailable"})))
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let err = h.api.subscribers.get("3").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Database unavailable");
    assert_eq!(err.data, Some(json!({"error": "Database unavailable"})));
}

#[tokio::test]
async fn test_timeout_is_normalized_and_not_toasted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenders"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let h = harness(&server, Duration::from_millis(50));
    h.session.store().set(TOKEN_KEY, "abc123").unwrap();
    let list = ListController::for_service(h.api.tenders.clone(), h.notifier.clone());

    let err = list.load().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Timeout);
    assert_eq!(err.status, None);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test]
async fn test_list_envelope_shapes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tenders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 11, "title": "Bridge repair"}],
            "total": 21,
            "page": 3,
            "totalPages": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Works"},
            {"id": "2", "name": "Goods"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/procedures"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "Not allowed"})),
        )
        .mount(&server)
        .await;

    let h = logged_in(&server);

    let tenders = h.api.tenders.list(&ListQuery::new(3, 10)).await.unwrap();
    assert_eq!((tenders.total, tenders.page, tenders.total_pages), (21, 3, 3));

    let categories = h.api.categories.list(&ListQuery::new(1, 10)).await.unwrap();
    assert_eq!(categories.total, 2);
    assert_eq!(categories.total_pages, 1);
    assert_eq!(categories.data[1].id, "2");

    let err = h.api.procedures.list(&ListQuery::new(1, 10)).await.unwrap_err();
    assert_eq!(err.message, "Not allowed");
}

fn complete_tender_form() -> TenderForm {
    let mut form = TenderForm::new();
    form.title = "Construction of school gym".into();
    form.procurement_number = "REF-2026-044".into();
    form.publication_date = parse_timestamp("2026-04-01");
    form.expiry_date = parse_timestamp("2026-05-01");
    form.select_category("1", "Works");
    form.procedure_id = Some("1".into());
    form.notice_type_id = Some("1".into());
    form.contracting_authority_id = Some("2".into());
    form
}

#[tokio::test]
async fn test_tender_without_documents_never_calls_create() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tenders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let err = submit_create(&h.api.tenders, &complete_tender_form(), h.notifier.as_ref(), None)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        h.notifier.messages(ToastLevel::Error),
        vec!["At least one document is required for the tender"]
    );
}

#[tokio::test]
async fn test_tender_create_is_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tenders"))
        .and(|req: &Request| {
            let is_multipart = req
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("multipart/form-data"));
            let body = String::from_utf8_lossy(&req.body);
            is_multipart
                && body.contains("name=\"file1\"; filename=\"dossier.pdf\"")
                && body.contains("REF-2026-044")
        })
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"id": 44, "title": "Construction of school gym", "file1": "/uploads/tenders/dossier.pdf"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let mut form = complete_tender_form();
    form.attach(DocumentUpload::new("dossier.pdf", b"%PDF-1.4".to_vec()))
        .unwrap();

    let tender = submit_create(&h.api.tenders, &form, h.notifier.as_ref(), None)
        .await
        .unwrap();

    assert_eq!(tender.id, "44");
    assert_eq!(h.notifier.messages(ToastLevel::Success), vec!["Tender created successfully"]);
}

#[tokio::test]
async fn test_create_refetches_when_only_id_returned() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/regions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "insertId": 12})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/regions/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12, "name": "Vlorë"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let draft = td_client::forms::reference::ReferenceDraft { name: "Vlorë".into() };
    let region = h.api.regions.create(&draft).await.unwrap();

    assert_eq!(region.id, "12");
}

#[tokio::test]
async fn test_document_download_and_save() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/uploads/tenders/dossier.pdf"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 dossier".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let reference = format!("{}/uploads/tenders/dossier.pdf", server.uri());
    let bytes = h.api.tenders.download_document(&reference).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let saved = td_client::download::save_download(dir.path(), &reference, &bytes).unwrap();
    assert_eq!(saved.file_name().unwrap(), "dossier.pdf");
    assert_eq!(std::fs::read(saved).unwrap(), b"%PDF-1.4 dossier");
}

#[tokio::test]
async fn test_download_from_foreign_host_carries_no_token() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .and(|req: &Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(1)
        .mount(&foreign)
        .await;

    let h = logged_in(&server);
    let reference = format!("{}/doc.pdf", foreign.uri());
    let bytes = h.api.tenders.download_document(&reference).await.unwrap();

    assert_eq!(bytes, b"%PDF-1.4");
    let requests = foreign.received_requests().await.unwrap();
    assert!(requests.iter().all(|req| !req.headers.contains_key("authorization")));
}

#[tokio::test]
async fn test_extend_expiry_sends_day_delta() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/subscribers/3/extend"))
        .and(body_partial_json(json!({"days": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 3, "username": "acme", "expiryDate": "2026-07-01"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let form = ExtendExpiryForm::by_days(parse_timestamp("2026-06-01"), 30);
    let subscriber = submit_extension(&h.api.subscribers, "3", &form, h.notifier.as_ref(), None)
        .await
        .unwrap();

    assert_eq!(subscriber.expiry_date, parse_timestamp("2026-07-01"));
}

#[tokio::test]
async fn test_rejected_extension_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/subscribers/3/extend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Cannot extend a suspended account"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/subscribers/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "username": "acme", "expiryDate": "2026-06-01"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let form = ExtendExpiryForm::by_days(parse_timestamp("2026-06-01"), 30);
    let err = submit_extension(&h.api.subscribers, "3", &form, h.notifier.as_ref(), None)
        .await
        .unwrap_err();

    assert_eq!(err.api().unwrap().message, "Cannot extend a suspended account");
    assert!(h.notifier.messages(ToastLevel::Success).is_empty());
    assert_eq!(
        h.notifier.messages(ToastLevel::Error),
        vec!["Cannot extend a suspended account".to_string()]
    );
}

#[tokio::test]
async fn test_non_positive_extension_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let current = parse_timestamp("2026-06-01");

    for new_expiry in ["2026-06-01", "2026-05-20"] {
        let form = ExtendExpiryForm::new(current, parse_timestamp(new_expiry));
        let err = submit_extension(&h.api.subscribers, "3", &form, h.notifier.as_ref(), None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}

#[tokio::test]
async fn test_delete_of_missing_row_refreshes_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 1, "name": "Tirana"}],
            "pagination": {"total": 1, "page": 1, "limit": 10, "totalPages": 1}
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/regions/5"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Region not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server);
    let list = ListController::for_service(h.api.regions.clone(), h.notifier.clone());
    list.load().await.unwrap();

    let err = list.delete_row("5").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(h.notifier.messages(ToastLevel::Error), vec!["Region not found"]);
    assert_eq!(list.rows().len(), 1);
}
