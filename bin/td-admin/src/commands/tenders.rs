//! Tender pages: list, detail, create/edit with documents, download

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use tracing::debug;

use td_client::download::{file_name_from_reference, save_download};
use td_client::forms::{DocumentUpload, TenderForm};
use td_client::models::{name_of, ReferenceItem, MAX_DOCUMENTS};
use td_client::{submit_create, submit_update, Notifier};

use super::{delete, parse_date, DeleteArgs, ListArgs, Reported, NO_RECORDS};
use crate::console::Console;
use crate::table::{date, render_page, text, Table};

#[derive(Args, Debug, Clone, Default)]
pub struct TenderFilters {
    /// Category id or name
    #[arg(long)]
    pub category: Option<String>,
    /// Region id
    #[arg(long)]
    pub region: Option<String>,
    /// Procedure id
    #[arg(long)]
    pub procedure: Option<String>,
    /// Notice type id
    #[arg(long = "notice-type")]
    pub notice_type: Option<String>,
    /// Contract type id
    #[arg(long = "contract-type")]
    pub contract_type: Option<String>,
    /// State id
    #[arg(long)]
    pub state: Option<String>,
}

/// Tender fields. On update, omitted fields keep their stored value.
#[derive(Args, Debug, Clone, Default)]
pub struct TenderArgs {
    #[arg(long)]
    pub title: Option<String>,
    /// Procurement reference number
    #[arg(long)]
    pub number: Option<String>,
    /// Publication date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub published: Option<DateTime<Utc>>,
    /// Submission deadline (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub expires: Option<DateTime<Utc>>,
    /// Category id or name
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long = "sub-category")]
    pub sub_category: Option<String>,
    /// Procedure id
    #[arg(long)]
    pub procedure: Option<String>,
    /// Contract type id
    #[arg(long = "contract-type")]
    pub contract_type: Option<String>,
    /// Notice type id
    #[arg(long = "notice-type")]
    pub notice_type: Option<String>,
    /// Region id
    #[arg(long)]
    pub region: Option<String>,
    /// State id
    #[arg(long)]
    pub state: Option<String>,
    /// Contracting authority id
    #[arg(long)]
    pub authority: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Estimated value
    #[arg(long)]
    pub price: Option<f64>,
    /// Document to upload, repeat for several (at most 5 per tender)
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum TenderCommand {
    /// List tenders
    List {
        #[command(flatten)]
        list: ListArgs,
        #[command(flatten)]
        filters: TenderFilters,
    },
    /// Show one tender as JSON
    Get { id: String },
    /// Publish a new tender
    Create(TenderArgs),
    /// Edit a tender
    Update {
        id: String,
        #[command(flatten)]
        fields: TenderArgs,
        /// Remove a stored document, by reference or file name
        #[arg(long = "drop-document")]
        drop_documents: Vec<String>,
    },
    /// Remove a tender
    Delete(DeleteArgs),
    /// Save tender documents to disk
    Download {
        id: String,
        /// Document slot 1-5; every document when omitted
        #[arg(long)]
        slot: Option<usize>,
        /// Target directory (defaults to downloads.dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

pub async fn run(console: &Console, command: TenderCommand) -> Result<()> {
    let service = &console.api.tenders;
    let notifier = console.notifier();
    match command {
        TenderCommand::List { list, filters } => {
            let categories = console.api.categories.all().await.reported(notifier)?;
            let mut query = list.query(console.config.lists.page_size);
            if let Some(raw) = filters.category.as_deref() {
                query.set_filter("categoryId", find_category(&categories, raw)?.id.as_str());
            }
            let by_id = [
                ("regionId", filters.region),
                ("procedureId", filters.procedure),
                ("noticeTypeId", filters.notice_type),
                ("contractTypeId", filters.contract_type),
                ("stateId", filters.state),
            ];
            for (key, value) in by_id {
                if let Some(value) = value {
                    query.set_filter(key, value);
                }
            }

            let controller = console.list_of(service);
            controller.open(query).await?;
            let mut table = Table::new(&[
                "ID", "Number", "Title", "Category", "Subcategory", "Published", "Expires", "Docs",
            ]);
            for tender in controller.rows() {
                table.row(vec![
                    tender.id.clone(),
                    tender.procurement_number.clone(),
                    tender.title.clone(),
                    text(name_of(&categories, tender.category_id.as_deref())),
                    text(tender.sub_category.as_deref()),
                    date(tender.publication_date),
                    date(tender.expiry_date),
                    tender.documents().len().to_string(),
                ]);
            }
            print!("{}", render_page(&table, controller.pagination(), NO_RECORDS));
        }
        TenderCommand::Get { id } => {
            let tender = service.get(&id).await.reported(notifier)?;
            println!("{}", serde_json::to_string_pretty(&tender)?);
        }
        TenderCommand::Create(fields) => {
            let mut form = TenderForm::new();
            fields.apply(console, &mut form).await?;
            let created = submit_create(service, &form, notifier, None).await?;
            println!("{}", created.id);
        }
        TenderCommand::Update {
            id,
            fields,
            drop_documents,
        } => {
            let tender = service.get(&id).await.reported(notifier)?;
            let categories = console.api.categories.all().await.reported(notifier)?;
            let mut form = TenderForm::from_tender(&tender, &categories);
            for wanted in &drop_documents {
                drop_document(&mut form, wanted, notifier)?;
            }
            fields.apply(console, &mut form).await?;
            submit_update(service, &id, &form, notifier, None).await?;
        }
        TenderCommand::Delete(args) => {
            delete(console, service, &args).await?;
        }
        TenderCommand::Download { id, slot, dir } => {
            let tender = service.get(&id).await.reported(notifier)?;
            let dir = dir.unwrap_or_else(|| PathBuf::from(&console.config.downloads.dir));
            let slots: Vec<usize> = match slot {
                Some(slot) => vec![slot],
                None => (1..=MAX_DOCUMENTS)
                    .filter(|slot| tender.document(*slot).is_some())
                    .collect(),
            };
            if slots.is_empty() {
                notifier.info("This tender has no documents");
                return Ok(());
            }
            for slot in slots {
                let (reference, bytes) = service.download_slot(&tender, slot).await.reported(notifier)?;
                let path = save_download(&dir, &reference, &bytes)
                    .with_context(|| format!("Failed to save {} into {}", reference, dir.display()))?;
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

impl TenderArgs {
    async fn apply(self, console: &Console, form: &mut TenderForm) -> Result<()> {
        let notifier = console.notifier();
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(number) = self.number {
            form.procurement_number = number;
        }
        if self.published.is_some() {
            form.publication_date = self.published;
        }
        if self.expires.is_some() {
            form.expiry_date = self.expires;
        }
        if let Some(raw) = self.category.as_deref() {
            let categories = console.api.categories.all().await.reported(notifier)?;
            let category = find_category(&categories, raw)?;
            form.select_category(category.id.clone(), category.name.clone());
        }
        if let Some(sub) = self.sub_category.as_deref() {
            if sub.trim().is_empty() {
                form.clear_sub_category();
            } else {
                form.select_sub_category(sub).reported(notifier)?;
            }
        }

        let ids = [
            (&mut form.procedure_id, self.procedure),
            (&mut form.contract_type_id, self.contract_type),
            (&mut form.notice_type_id, self.notice_type),
            (&mut form.region_id, self.region),
            (&mut form.state_id, self.state),
            (&mut form.contracting_authority_id, self.authority),
        ];
        for (slot, value) in ids {
            if let Some(value) = value {
                *slot = Some(value).filter(|v| !v.trim().is_empty());
            }
        }

        if let Some(description) = self.description {
            form.description = description;
        }
        if self.price.is_some() {
            form.price = self.price;
        }

        for path in &self.files {
            let upload = DocumentUpload::from_path(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            debug!(file = %upload.file_name, mime = %upload.mime, size = upload.bytes.len(), "Attaching document");
            form.attach(upload).reported(notifier)?;
        }
        Ok(())
    }
}

/// Match a category by id, or by name ignoring case.
fn find_category<'a>(categories: &'a [ReferenceItem], raw: &str) -> Result<&'a ReferenceItem> {
    let raw = raw.trim();
    categories
        .iter()
        .find(|c| c.id == raw)
        .or_else(|| categories.iter().find(|c| c.name.eq_ignore_ascii_case(raw)))
        .with_context(|| format!("Unknown category '{}'", raw))
}

fn drop_document(form: &mut TenderForm, wanted: &str, notifier: &dyn Notifier) -> Result<()> {
    let reference = form
        .existing_documents()
        .iter()
        .find(|r| r.as_str() == wanted || file_name_from_reference(r) == wanted)
        .cloned();
    match reference {
        Some(reference) => {
            form.detach_existing(&reference);
            Ok(())
        }
        None => {
            notifier.error(&format!("The tender has no document '{}'", wanted));
            bail!("unknown document '{}'", wanted)
        }
    }
}
