//! Subcommand handlers

pub mod invoice;
pub mod reference;
pub mod subscribers;
pub mod tenders;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use td_client::forms::FieldErrors;
use td_client::{ApiError, Notifier, Resource, ResourceService};
use td_common::lenient::parse_timestamp;
use td_common::ListQuery;

use crate::console::{confirm, Console};

/// Empty-state line for every list
pub const NO_RECORDS: &str = "No records found.";

/// Paging and search shared by every `list` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page (defaults to lists.page_size)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Free-text search
    #[arg(long, short)]
    pub search: Option<String>,
}

impl ListArgs {
    pub fn query(&self, default_limit: u32) -> ListQuery {
        let mut query = ListQuery::new(self.page, self.limit.unwrap_or(default_limit));
        if let Some(search) = &self.search {
            query.set_search(search.as_str());
        }
        query
    }
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    pub id: String,

    /// Do not ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("'{}' is not a date, expected YYYY-MM-DD", raw))
}

/// Toast failures before handing them to anyhow.
pub trait Reported<T> {
    fn reported(self, notifier: &dyn Notifier) -> Result<T>;
}

impl<T> Reported<T> for std::result::Result<T, ApiError> {
    fn reported(self, notifier: &dyn Notifier) -> Result<T> {
        self.map_err(|err| {
            notifier.report(&err);
            err.into()
        })
    }
}

impl<T> Reported<T> for td_client::Result<T> {
    fn reported(self, notifier: &dyn Notifier) -> Result<T> {
        self.map_err(|err| {
            notifier.report_error(&err);
            err.into()
        })
    }
}

impl<T> Reported<T> for std::result::Result<T, FieldErrors> {
    fn reported(self, notifier: &dyn Notifier) -> Result<T> {
        self.map_err(|errors| {
            notifier.error(errors.first_message().unwrap_or("Invalid input"));
            errors.into()
        })
    }
}

/// Delete one record after confirmation. Returns whether it was deleted.
pub async fn delete<R: Resource>(
    console: &Console,
    service: &ResourceService<R>,
    args: &DeleteArgs,
) -> Result<bool> {
    if !args.yes {
        let prompt = format!("Delete {} {}?", service.label().to_lowercase(), args.id);
        if !confirm(&prompt)? {
            eprintln!("Cancelled.");
            return Ok(false);
        }
    }
    service.delete(&args.id).await.reported(console.notifier())?;
    console
        .notifier()
        .success(&format!("{} deleted successfully", service.label()));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_client::{ErrorKind, RecordingNotifier, ToastLevel};

    #[test]
    fn test_list_args_build_query() {
        let args = ListArgs {
            page: 2,
            limit: None,
            search: Some("  bridge ".into()),
        };
        let query = args.query(10);
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 10);
        assert_eq!(query.search.as_deref(), Some("bridge"));
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-05-01").is_ok());
        assert!(parse_date("tomorrow").unwrap_err().contains("tomorrow"));
    }

    #[test]
    fn test_reported_toasts_api_errors() {
        let notifier = RecordingNotifier::new();
        let result: std::result::Result<(), ApiError> =
            Err(ApiError::new(ErrorKind::NotFound, "Record not found"));
        assert!(result.reported(&notifier).is_err());
        assert_eq!(notifier.messages(ToastLevel::Error), vec!["Record not found"]);
    }

    #[test]
    fn test_reported_toasts_first_field_error() {
        let notifier = RecordingNotifier::new();
        let result: std::result::Result<(), FieldErrors> =
            Err(FieldErrors::single("name", "Name is required"));
        assert!(result.reported(&notifier).is_err());
        assert_eq!(notifier.messages(ToastLevel::Error), vec!["Name is required"]);
    }
}
