//! Subscriber pages: accounts, packages and subscription extension

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use td_client::forms::subscriber::submit_extension;
use td_client::forms::{ExtendExpiryForm, SubscriberForm};
use td_client::models::Subscriber;
use td_client::{submit_create, submit_update};

use super::{delete, parse_date, DeleteArgs, ListArgs, Reported, NO_RECORDS};
use crate::console::Console;
use crate::table::{date, render_page, text, Table};

/// Subscriber fields. On update, omitted fields keep their stored value.
#[derive(Args, Debug, Clone, Default)]
pub struct SubscriberArgs {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Required when creating; on update, only sent when given
    #[arg(long)]
    pub password: Option<String>,
    /// Package id
    #[arg(long)]
    pub package: Option<String>,
    /// Subscription end (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub expires: Option<DateTime<Utc>>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long = "fiscal-number")]
    pub fiscal_number: Option<String>,
    /// Account enabled (true/false)
    #[arg(long)]
    pub active: Option<bool>,
}

impl SubscriberArgs {
    fn apply(self, form: &mut SubscriberForm) {
        if let Some(username) = self.username {
            form.username = username;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if let Some(password) = self.password {
            form.password = password;
        }
        if let Some(package) = self.package {
            form.package_id = Some(package).filter(|p| !p.trim().is_empty());
        }
        if self.expires.is_some() {
            form.expiry_date = self.expires;
        }
        if let Some(phone) = self.phone {
            form.phone = phone;
        }
        if let Some(company) = self.company {
            form.company = company;
        }
        if let Some(fiscal_number) = self.fiscal_number {
            form.fiscal_number = fiscal_number;
        }
        if let Some(active) = self.active {
            form.is_active = active;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SubscriberCommand {
    /// List subscribers
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Package id
        #[arg(long)]
        package: Option<String>,
        /// Only enabled (true) or disabled (false) accounts
        #[arg(long)]
        active: Option<bool>,
    },
    /// Show one subscriber as JSON
    Get { id: String },
    /// Register a subscriber
    Create(SubscriberArgs),
    /// Edit a subscriber
    Update {
        id: String,
        #[command(flatten)]
        fields: SubscriberArgs,
    },
    /// Remove a subscriber
    Delete(DeleteArgs),
    /// Push the subscription end date forward
    Extend {
        id: String,
        /// Days to add to the current expiry
        #[arg(long, conflicts_with = "until")]
        days: Option<i64>,
        /// New expiry date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        until: Option<DateTime<Utc>>,
    },
}

pub async fn run(console: &Console, command: SubscriberCommand) -> Result<()> {
    let service = &console.api.subscribers;
    let notifier = console.notifier();
    match command {
        SubscriberCommand::List { list, package, active } => {
            let mut query = list.query(console.config.lists.page_size);
            if let Some(package) = package {
                query.set_filter("packageId", package);
            }
            if let Some(active) = active {
                query.set_filter("isActive", active.to_string());
            }
            let controller = console.list_of(service);
            controller.open(query).await?;

            let now = Utc::now();
            let mut table = Table::new(&[
                "ID", "Username", "Email", "Company", "Package", "Expires", "Status",
            ]);
            for subscriber in controller.rows() {
                table.row(vec![
                    subscriber.id.clone(),
                    subscriber.username.clone(),
                    subscriber.email.clone(),
                    text(subscriber.company.as_deref()),
                    text(subscriber.package_name.as_deref()),
                    date(subscriber.expiry_date),
                    status(&subscriber, now).to_string(),
                ]);
            }
            print!("{}", render_page(&table, controller.pagination(), NO_RECORDS));
        }
        SubscriberCommand::Get { id } => {
            let subscriber = service.get(&id).await.reported(notifier)?;
            println!("{}", serde_json::to_string_pretty(&subscriber)?);
        }
        SubscriberCommand::Create(fields) => {
            let mut form = SubscriberForm::new();
            fields.apply(&mut form);
            let created = submit_create(service, &form, notifier, None).await?;
            println!("{}", created.id);
        }
        SubscriberCommand::Update { id, fields } => {
            let current = service.get(&id).await.reported(notifier)?;
            let mut form = SubscriberForm::from_subscriber(&current);
            fields.apply(&mut form);
            submit_update(service, &id, &form, notifier, None).await?;
        }
        SubscriberCommand::Delete(args) => {
            delete(console, service, &args).await?;
        }
        SubscriberCommand::Extend { id, days, until } => {
            let subscriber = service.get(&id).await.reported(notifier)?;
            let form = match (days, until) {
                (Some(days), _) => ExtendExpiryForm::by_days(subscriber.expiry_date, days),
                (None, Some(until)) => ExtendExpiryForm::new(subscriber.expiry_date, Some(until)),
                (None, None) => bail!("pass --days or --until"),
            };
            let extended = submit_extension(service, &id, &form, notifier, None).await?;
            println!("{}", date(extended.expiry_date));
        }
    }
    Ok(())
}

fn status(subscriber: &Subscriber, now: DateTime<Utc>) -> &'static str {
    if !subscriber.is_active {
        "disabled"
    } else if subscriber.is_expired(now) {
        "expired"
    } else {
        "active"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_common::lenient::parse_timestamp;

    fn subscriber(active: bool, expiry: &str) -> Subscriber {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "username": "buildco",
            "isActive": active,
            "expiryDate": expiry
        }))
        .unwrap()
    }

    #[test]
    fn test_status_column() {
        let now = parse_timestamp("2026-06-01").unwrap();
        assert_eq!(status(&subscriber(true, "2026-12-31"), now), "active");
        assert_eq!(status(&subscriber(true, "2026-01-31"), now), "expired");
        assert_eq!(status(&subscriber(false, "2026-12-31"), now), "disabled");
    }

    #[test]
    fn test_update_keeps_password_empty_unless_given() {
        let mut form = SubscriberForm::new();
        SubscriberArgs {
            username: Some("buildco".into()),
            active: Some(false),
            ..Default::default()
        }
        .apply(&mut form);

        assert_eq!(form.username, "buildco");
        assert!(form.password.is_empty());
        assert!(!form.is_active);
    }
}
