//! Generic resource service
//!
//! Every admin entity is served by the same five calls. A [`Resource`] names
//! the endpoint, the entity type and the draft type submitted by forms;
//! [`ResourceService`] implements `list/get/create/update/delete` once for all
//! of them.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use td_common::{ListQuery, Page};
use tracing::{debug, info};

use crate::client::{json_body, ApiClient};
use crate::envelope::{normalize_list, normalize_one, unwrap_data};
use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::transport::RequestBody;

/// Turns a validated draft into a request body.
pub trait IntoBody {
    fn into_body(&self) -> ApiResult<RequestBody>;
}

/// Implements [`IntoBody`] as a JSON body for serializable drafts.
#[macro_export]
macro_rules! json_draft {
    ($($draft:ty),+ $(,)?) => {
        $(
            impl $crate::resource::IntoBody for $draft {
                fn into_body(&self) -> $crate::error::ApiResult<$crate::transport::RequestBody> {
                    $crate::client::json_body(self)
                }
            }
        )+
    };
}

/// Static description of one REST resource.
pub trait Resource: Send + Sync + 'static {
    /// Collection path, e.g. `/tenders`
    const PATH: &'static str;
    /// Human-readable singular name used in toasts
    const LABEL: &'static str;

    type Entity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;
    type Draft: IntoBody + Send + Sync;
}

/// CRUD service for one resource
pub struct ResourceService<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceService<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceService")
            .field("path", &R::PATH)
            .finish()
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn label(&self) -> &'static str {
        R::LABEL
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::PATH, urlencoding::encode(id.trim()))
    }

    /// One page of records.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<Page<R::Entity>> {
        let body = self.client.get(R::PATH, query.to_pairs()).await?;
        let page = normalize_list(body, query)?;
        debug!(
            resource = R::PATH,
            page = page.page,
            rows = page.data.len(),
            total = page.total,
            "Fetched list page"
        );
        Ok(page)
    }

    /// Every record, unpaginated; used to fill dropdowns.
    pub async fn all(&self) -> ApiResult<Vec<R::Entity>> {
        let body = self.client.get(R::PATH, Vec::new()).await?;
        let page: Page<R::Entity> = normalize_list(body, &ListQuery::new(1, 0))?;
        Ok(page.data)
    }

    pub async fn get(&self, id: &str) -> ApiResult<R::Entity> {
        let body = self.client.get(&Self::item_path(id), Vec::new()).await?;
        normalize_one(body)
    }

    pub async fn create(&self, draft: &R::Draft) -> ApiResult<R::Entity> {
        let body = self
            .client
            .send_body(Method::POST, R::PATH, draft.into_body()?)
            .await?;
        let created = self.entity_or_refetch(body).await?;
        info!(resource = R::PATH, "{} created", R::LABEL);
        Ok(created)
    }

    pub async fn update(&self, id: &str, draft: &R::Draft) -> ApiResult<R::Entity> {
        let body = self
            .client
            .send_body(Method::PUT, &Self::item_path(id), draft.into_body()?)
            .await?;
        let updated = match self.entity_or_refetch(body).await {
            Ok(entity) => entity,
            // some endpoints answer {success, message} only
            Err(err) if err.kind == ErrorKind::Decode => self.get(id).await?,
            Err(err) => return Err(err),
        };
        info!(resource = R::PATH, id, "{} updated", R::LABEL);
        Ok(updated)
    }

    /// Partial update with an arbitrary JSON patch.
    pub async fn patch<P: Serialize + ?Sized>(&self, id: &str, patch: &P) -> ApiResult<R::Entity> {
        let body = self
            .client
            .send_body(Method::PATCH, &Self::item_path(id), json_body(patch)?)
            .await?;
        match self.entity_or_refetch(body).await {
            Err(err) if err.kind == ErrorKind::Decode => self.get(id).await,
            other => other,
        }
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let body = self.client.delete(&Self::item_path(id)).await?;
        unwrap_data(body)?;
        info!(resource = R::PATH, id, "{} deleted", R::LABEL);
        Ok(())
    }

    /// Decode the entity from a write response; if the response only carries
    /// the new id, fetch the full record.
    async fn entity_or_refetch(&self, body: Value) -> ApiResult<R::Entity> {
        let data = unwrap_data(body)?;
        match serde_json::from_value::<R::Entity>(data.clone()) {
            Ok(entity) => Ok(entity),
            Err(decode_err) => {
                let id = data
                    .get("id")
                    .or_else(|| data.get("insertId"))
                    .and_then(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    });
                match id {
                    Some(id) => self.get(&id).await,
                    None => Err(ApiError::decode(decode_err)),
                }
            }
        }
    }

    /// Sub-path of a single record, e.g. `/subscribers/4/extend`.
    pub fn action_path(&self, id: &str, action: &str) -> String {
        format!("{}/{}", Self::item_path(id), action.trim_start_matches('/'))
    }
}
