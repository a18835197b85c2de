//! Subscriber forms: create/edit and expiry extension

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;

use super::validation::{email_pattern, non_blank, phone_pattern, FieldErrors};
use super::Form;
use crate::error::Result;
use crate::json_draft;
use crate::list::ListController;
use crate::models::Subscriber;
use crate::notify::Notifier;
use crate::resource::ResourceService;
use crate::services::Subscribers;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct SubscriberForm {
    pub username: String,
    pub email: String,
    /// Required when creating; blank on edit keeps the current password
    pub password: String,
    pub is_active: bool,
    pub package_id: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub phone: String,
    pub company: String,
    pub fiscal_number: String,
    editing: bool,
}

impl SubscriberForm {
    pub fn new() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }

    pub fn from_subscriber(subscriber: &Subscriber) -> Self {
        Self {
            username: subscriber.username.clone(),
            email: subscriber.email.clone(),
            password: String::new(),
            is_active: subscriber.is_active,
            package_id: subscriber.package_id.clone(),
            expiry_date: subscriber.expiry_date,
            phone: subscriber.phone.clone().unwrap_or_default(),
            company: subscriber.company.clone().unwrap_or_default(),
            fiscal_number: subscriber.fiscal_number.clone().unwrap_or_default(),
            editing: true,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }
}

impl Form for SubscriberForm {
    type Draft = SubscriberDraft;

    fn validate(&self) -> std::result::Result<SubscriberDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        if errors.require("username", &self.username, "Username is required")
            && self.username.trim().chars().count() < 3
        {
            errors.add("username", "Username must be at least 3 characters");
        }
        if errors.require("email", &self.email, "Email is required")
            && !email_pattern().is_match(self.email.trim())
        {
            errors.add("email", "Email address is invalid");
        }
        if !self.editing || !self.password.is_empty() {
            if self.password.is_empty() {
                errors.add("password", "Password is required");
            } else if self.password.chars().count() < MIN_PASSWORD_LEN {
                errors.add("password", "Password must be at least 6 characters");
            }
        }
        if let Some(phone) = non_blank(&self.phone) {
            if !phone_pattern().is_match(&phone) {
                errors.add("phone", "Phone number is invalid");
            }
        }
        errors.require_some("packageId", self.package_id.as_ref(), "Package is required");
        errors.require_some("expiryDate", self.expiry_date.as_ref(), "Expiry date is required");

        errors.into_result(())?;

        Ok(SubscriberDraft {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            is_active: self.is_active,
            package_id: self.package_id.clone(),
            expiry_date: self.expiry_date,
            phone: non_blank(&self.phone),
            company: non_blank(&self.company),
            fiscal_number: non_blank(&self.fiscal_number),
        })
    }
}

/// Validated subscriber, sent as JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberDraft {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_active: bool,
    pub package_id: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_number: Option<String>,
}

json_draft!(SubscriberDraft);

/// Extend a subscriber's expiry date.
///
/// The delta is counted in whole calendar days from the current expiry (or
/// from `today` when the subscriber has none) and must be positive.
#[derive(Debug, Clone)]
pub struct ExtendExpiryForm {
    pub current_expiry: Option<DateTime<Utc>>,
    pub new_expiry: Option<DateTime<Utc>>,
    today: DateTime<Utc>,
}

impl ExtendExpiryForm {
    pub fn new(current_expiry: Option<DateTime<Utc>>, new_expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            current_expiry,
            new_expiry,
            today: Utc::now(),
        }
    }

    /// Extend by a number of days past the current expiry.
    pub fn by_days(current_expiry: Option<DateTime<Utc>>, days: i64) -> Self {
        let mut form = Self::new(current_expiry, None);
        let base = form.base_date();
        form.new_expiry = Some(base + Duration::days(days));
        form
    }

    pub fn with_today(mut self, today: DateTime<Utc>) -> Self {
        self.today = today;
        self
    }

    fn base_date(&self) -> DateTime<Utc> {
        self.current_expiry.unwrap_or(self.today)
    }

    /// Whole-day difference between the new and the base date.
    pub fn delta_days(&self) -> Option<i64> {
        let new = self.new_expiry?;
        Some((new.date_naive() - self.base_date().date_naive()).num_days())
    }
}

impl Form for ExtendExpiryForm {
    type Draft = ExpiryExtension;

    fn validate(&self) -> std::result::Result<ExpiryExtension, FieldErrors> {
        let Some(new_expiry) = self.new_expiry else {
            return Err(FieldErrors::single("expiryDate", "New expiry date is required"));
        };
        let days = self.delta_days().unwrap_or_default();
        if days <= 0 {
            return Err(FieldErrors::single(
                "expiryDate",
                "New expiry date must be after the current expiry date",
            ));
        }
        let expiry_date = new_expiry
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        Ok(ExpiryExtension { expiry_date, days })
    }
}

/// Body of `PATCH /subscribers/{id}/extend`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryExtension {
    pub expiry_date: DateTime<Utc>,
    pub days: i64,
}

/// Validate and send an extension. Nothing is sent for a non-positive delta.
pub async fn submit_extension(
    service: &ResourceService<Subscribers>,
    id: &str,
    form: &ExtendExpiryForm,
    notifier: &dyn Notifier,
    list: Option<&ListController<Subscriber>>,
) -> Result<Subscriber> {
    let extension = form.validate().map_err(|errors| {
        notifier.error(errors.first_message().unwrap_or("Invalid expiry date"));
        errors
    })?;
    match service.extend_expiry(id, &extension).await {
        Ok(subscriber) => {
            notifier.success(&format!("Subscription extended by {} days", extension.days));
            if let Some(list) = list {
                let _ = list.refresh().await;
            }
            Ok(subscriber)
        }
        Err(err) => {
            notifier.report(&err);
            Err(err.into())
        }
    }
}
