//! Pro-forma invoice generation
//!
//! An [`Invoice`] is laid out into a list of draw operations on a fixed A4
//! page ([`layout`]) which is then rendered to PDF bytes ([`render`]).

pub mod layout;
pub mod render;

use chrono::{Duration, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::download::sanitize_file_name;
use crate::error::Result;
use crate::models::{Package, Subscriber};

/// Days between issue and due date
pub const PAYMENT_TERM_DAYS: i64 = 15;

/// The company issuing the invoice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Issuer {
    pub name: String,
    pub address: String,
    pub fiscal_number: String,
    pub email: String,
    pub phone: String,
    pub bank_account: String,
}

/// The billed subscriber
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BilledClient {
    /// Company, or username when no company is set
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub fiscal_number: Option<String>,
}

impl From<&Subscriber> for BilledClient {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            name: subscriber.display_company().to_string(),
            username: subscriber.username.clone(),
            email: subscriber.email.clone(),
            phone: subscriber.phone.clone(),
            fiscal_number: subscriber.fiscal_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl InvoiceLine {
    pub fn amount(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub issuer: Issuer,
    pub client: BilledClient,
    pub lines: Vec<InvoiceLine>,
    pub currency: String,
    pub vat_percent: f64,
}

impl Invoice {
    /// Invoice for one subscription package. Without an explicit number the
    /// number is derived from the issue date and subscriber id.
    pub fn for_subscription(
        issuer: Issuer,
        subscriber: &Subscriber,
        package: &Package,
        issue_date: NaiveDate,
        number: Option<String>,
    ) -> Self {
        let description = match package.duration_days {
            Some(days) => format!("{} subscription ({} days)", package.name, days),
            None => format!("{} subscription", package.name),
        };
        Self {
            number: number
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| invoice_number(issue_date, &subscriber.id)),
            issue_date,
            due_date: issue_date + Duration::days(PAYMENT_TERM_DAYS),
            issuer,
            client: BilledClient::from(subscriber),
            lines: vec![InvoiceLine {
                description,
                quantity: 1,
                unit_price: package.price.unwrap_or(0.0),
            }],
            currency: "EUR".to_string(),
            vat_percent: 0.0,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_vat(mut self, percent: f64) -> Self {
        self.vat_percent = percent.max(0.0);
        self
    }

    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(InvoiceLine::amount).sum()
    }

    pub fn vat_amount(&self) -> f64 {
        round_cents(self.subtotal() * self.vat_percent / 100.0)
    }

    pub fn total(&self) -> f64 {
        round_cents(self.subtotal() + self.vat_amount())
    }

    pub fn file_name(&self) -> String {
        invoice_file_name(&self.client.name, &self.number)
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `{YYYYMMDD}-{subscriberId}`
pub fn invoice_number(issue_date: NaiveDate, subscriber_id: &str) -> String {
    format!("{}-{}", issue_date.format("%Y%m%d"), subscriber_id.trim())
}

/// `{company}-Pro-Fatura-{number}.pdf` with unsafe characters replaced by `_`.
pub fn invoice_file_name(company: &str, number: &str) -> String {
    let company = if company.trim().is_empty() { "client" } else { company };
    sanitize_file_name(&format!("{}-Pro-Fatura-{}.pdf", company.trim(), number.trim()))
}

/// `1234.5` → `1,234.50 EUR`
pub fn format_amount(amount: f64, currency: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped}.{:02} {currency}", cents % 100)
}

/// Render the invoice to PDF bytes.
pub fn generate(invoice: &Invoice) -> Result<Vec<u8>> {
    let ops = layout::layout(invoice);
    render::render(&format!("Pro-Fatura {}", invoice.number), &ops)
}

/// Render and write the invoice into `dir`. Returns the written path.
pub fn save(invoice: &Invoice, dir: &Path) -> Result<PathBuf> {
    let bytes = generate(invoice)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(invoice.file_name());
    std::fs::write(&path, bytes)?;
    info!(path = %path.display(), number = %invoice.number, "Invoice saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subscriber(company: Option<&str>) -> Subscriber {
        serde_json::from_value(json!({
            "id": 42, "username": "acme", "email": "office@acme.al", "company": company
        }))
        .unwrap()
    }

    fn package() -> Package {
        serde_json::from_value(json!({ "id": 2, "name": "Annual", "price": 150, "durationDays": 365 }))
            .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn test_invoice_number_and_file_name() {
        let invoice =
            Invoice::for_subscription(Issuer::default(), &subscriber(Some("Acme / Partners")), &package(), date(), None);
        assert_eq!(invoice.number, "20260309-42");
        assert_eq!(invoice.file_name(), "Acme _ Partners-Pro-Fatura-20260309-42.pdf");
    }

    #[test]
    fn test_file_name_falls_back_to_username() {
        let invoice = Invoice::for_subscription(
            Issuer::default(),
            &subscriber(None),
            &package(),
            date(),
            Some("INV-7".into()),
        );
        assert_eq!(invoice.file_name(), "acme-Pro-Fatura-INV-7.pdf");
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 3, 24).unwrap());
    }

    #[test]
    fn test_totals_with_vat() {
        let invoice = Invoice::for_subscription(Issuer::default(), &subscriber(None), &package(), date(), None)
            .with_vat(20.0);
        assert_eq!(invoice.subtotal(), 150.0);
        assert_eq!(invoice.vat_amount(), 30.0);
        assert_eq!(invoice.total(), 180.0);
        assert_eq!(invoice.lines[0].description, "Annual subscription (365 days)");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, "EUR"), "1,234.50 EUR");
        assert_eq!(format_amount(0.0, "ALL"), "0.00 ALL");
        assert_eq!(format_amount(1_000_000.0, "EUR"), "1,000,000.00 EUR");
        assert_eq!(format_amount(-12.5, "EUR"), "-12.50 EUR");
    }

    #[test]
    fn test_save_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let invoice = Invoice::for_subscription(Issuer::default(), &subscriber(None), &package(), date(), None);
        let path = save(&invoice, dir.path()).unwrap();
        assert!(path.ends_with("acme-Pro-Fatura-20260309-42.pdf"));
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
