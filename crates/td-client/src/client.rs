//! High-level API client
//!
//! Single point every service depends on. It attaches the bearer token,
//! reacts to expired sessions and normalizes every failure into an
//! [`ApiError`]. There is no retry, backoff or circuit breaking: a failed
//! request surfaces to the caller as-is.

use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::mock::MockTransport;
use crate::transport::{resolve_url, ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport};

/// Endpoints that must never carry the bearer token nor trigger a logout.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path.trim_start_matches('/').starts_with("auth/") || path.contains("/auth/")
}

/// Absolute references only get the token when they point at the API origin.
pub fn shares_origin(base_url: &str, path: &str) -> bool {
    if !(path.starts_with("http://") || path.starts_with("https://")) {
        return true;
    }
    match (Url::parse(base_url), Url::parse(path)) {
        (Ok(base), Ok(target)) => base.origin() == target.origin(),
        _ => false,
    }
}

/// TenderDesk API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthContext>,
}

impl ApiClient {
    /// Create a client; mock mode swaps the network for the in-memory fixture store.
    pub fn new(config: ClientConfig, auth: Arc<dyn AuthContext>) -> ApiResult<Self> {
        let transport: Arc<dyn Transport> = if config.mock {
            debug!("Using in-memory mock transport");
            Arc::new(MockTransport::with_fixtures())
        } else {
            Arc::new(HttpTransport::new(&config)?)
        };
        Ok(Self::with_transport(config, transport, auth))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthContext>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            auth,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn auth(&self) -> &Arc<dyn AuthContext> {
        &self.auth
    }

    /// Absolute URL for a path or document reference.
    pub fn url_for(&self, path: &str) -> String {
        resolve_url(&self.config.base_url, path)
    }

    /// Send a request and return the raw response if the status was 2xx.
    pub async fn send_raw(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let auth_endpoint = is_auth_endpoint(&request.path);
        if !auth_endpoint {
            if shares_origin(&self.config.base_url, &request.path) {
                request.bearer = self.auth.token();
            } else {
                debug!(path = %request.path, "Foreign host, sending without bearer token");
            }
        }

        let method = request.method.clone();
        let path = request.path.clone();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_timeout() {
                    debug!(%method, %path, "Request timed out");
                } else {
                    warn!(%method, %path, error = %err, "Request failed without a response");
                }
                return Err(err);
            }
        };

        if response.is_success() {
            return Ok(response);
        }

        let body = response.json_body();
        let data = if body.is_null() { None } else { Some(body) };
        let err = ApiError::from_status(response.status, data);

        if response.status == 401 && !auth_endpoint {
            self.auth.on_unauthorized();
        }

        debug!(%method, %path, status = response.status, message = %err.message, "API error");
        Err(err)
    }

    /// Send a request and decode the JSON body.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let response = self.send_raw(request).await?;
        Ok(response.json_body())
    }

    pub async fn get(&self, path: &str, query: Vec<(String, String)>) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::GET, path).with_query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::POST, path).with_body(json_body(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::PUT, path).with_body(json_body(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::PATCH, path).with_body(json_body(body)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    /// Send a request with an arbitrary body.
    pub async fn send_body(&self, method: Method, path: &str, body: RequestBody) -> ApiResult<Value> {
        self.send(ApiRequest::new(method, path).with_body(body)).await
    }

    /// Fetch raw bytes from an authenticated URL (tender documents).
    pub async fn download(&self, reference: &str) -> ApiResult<Vec<u8>> {
        let response = self.send_raw(ApiRequest::new(Method::GET, reference)).await?;
        Ok(response.body)
    }
}

/// Serialize any payload into a JSON request body.
pub fn json_body<B: Serialize + ?Sized>(body: &B) -> ApiResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::decode(format!("failed to encode request: {e}")))
}
