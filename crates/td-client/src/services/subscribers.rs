//! Subscriber resource

use serde_json::json;

use crate::error::{ApiResult, ErrorKind};
use crate::forms::subscriber::{ExpiryExtension, SubscriberDraft};
use crate::models::Subscriber;
use crate::resource::{Resource, ResourceService};

#[derive(Debug, Clone, Copy)]
pub struct Subscribers;

impl Resource for Subscribers {
    const PATH: &'static str = "/subscribers";
    const LABEL: &'static str = "Subscriber";
    type Entity = Subscriber;
    type Draft = SubscriberDraft;
}

impl ResourceService<Subscribers> {
    /// Push the expiry date forward. Only a validated [`ExpiryExtension`]
    /// can be sent, so the day-delta is always positive.
    pub async fn extend_expiry(&self, id: &str, extension: &ExpiryExtension) -> ApiResult<Subscriber> {
        let path = self.action_path(id, "extend");
        let body = self.client().patch(&path, extension).await?;
        match crate::envelope::normalize_one(body) {
            Ok(subscriber) => Ok(subscriber),
            // acknowledgement without a body
            Err(err) if err.kind == ErrorKind::Decode => self.get(id).await,
            Err(err) => Err(err),
        }
    }

    pub async fn set_active(&self, id: &str, active: bool) -> ApiResult<Subscriber> {
        self.patch(id, &json!({ "isActive": active })).await
    }
}
