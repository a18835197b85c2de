//! Pro-forma invoice for a subscriber's package

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use tracing::info;

use td_client::invoice::{self, format_amount, Invoice};

use super::{parse_date, Reported};
use crate::console::{issuer, Console};

#[derive(Args, Debug, Clone)]
pub struct InvoiceArgs {
    /// Subscriber id
    #[arg(long)]
    pub subscriber: String,
    /// Package id (defaults to the subscriber's package)
    #[arg(long)]
    pub package: Option<String>,
    /// Invoice number (defaults to YYYYMMDD-subscriber id)
    #[arg(long)]
    pub number: Option<String>,
    /// Issue date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,
    /// Output directory (defaults to invoice.output_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

fn issue_date(args: &InvoiceArgs) -> NaiveDate {
    args.date.unwrap_or_else(Utc::now).date_naive()
}

pub async fn run(console: &Console, args: InvoiceArgs) -> Result<()> {
    let notifier = console.notifier();
    let subscriber = console
        .api
        .subscribers
        .get(&args.subscriber)
        .await
        .reported(notifier)?;
    let package_id = args
        .package
        .clone()
        .or_else(|| subscriber.package_id.clone())
        .with_context(|| format!("subscriber {} has no package, pass --package", subscriber.id))?;
    let package = console.api.packages.get(&package_id).await.reported(notifier)?;

    let settings = &console.config.invoice;
    let invoice = Invoice::for_subscription(
        issuer(&console.config),
        &subscriber,
        &package,
        issue_date(&args),
        args.number.clone(),
    )
    .with_currency(settings.currency.clone())
    .with_vat(settings.vat_percent);

    let dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.output_dir));
    let path = invoice::save(&invoice, &dir).reported(notifier)?;
    info!(number = %invoice.number, path = %path.display(), "Invoice written");
    notifier.success(&format!(
        "Invoice {} for {}",
        invoice.number,
        format_amount(invoice.total(), &invoice.currency)
    ));
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_common::lenient::parse_timestamp;

    #[test]
    fn test_issue_date_from_argument() {
        let args = InvoiceArgs {
            subscriber: "1".into(),
            package: None,
            number: None,
            date: parse_timestamp("2026-03-09"),
            out: None,
        };
        assert_eq!(issue_date(&args), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    }
}
