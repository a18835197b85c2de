//! Reference data: simple named lists, contracting authorities and packages

use anyhow::Result;
use clap::{Args, Subcommand};

use td_client::forms::reference::ReferenceDraft;
use td_client::forms::{AuthorityForm, PackageForm, ReferenceForm};
use td_client::invoice::format_amount;
use td_client::models::ReferenceItem;
use td_client::services::{Authorities, Packages};
use td_client::{submit_create, submit_update, Resource, ResourceService};

use super::{delete, DeleteArgs, ListArgs, Reported, NO_RECORDS};
use crate::console::Console;
use crate::table::{render_page, text, Table};

#[derive(Subcommand, Debug)]
pub enum ReferenceCommand {
    /// List entries
    List(ListArgs),
    /// Add an entry
    Create { name: String },
    /// Rename an entry
    Update { id: String, name: String },
    /// Remove an entry
    Delete(DeleteArgs),
}

pub async fn run<R>(console: &Console, service: &ResourceService<R>, command: ReferenceCommand) -> Result<()>
where
    R: Resource<Entity = ReferenceItem, Draft = ReferenceDraft>,
{
    let notifier = console.notifier();
    match command {
        ReferenceCommand::List(args) => {
            let list = console.list_of(service);
            list.open(args.query(console.config.lists.page_size)).await?;
            let mut table = Table::new(&["ID", "Name"]);
            for item in list.rows() {
                table.row(vec![item.id, item.name]);
            }
            print!("{}", render_page(&table, list.pagination(), NO_RECORDS));
        }
        ReferenceCommand::Create { name } => {
            let created = submit_create(service, &ReferenceForm::new(name), notifier, None).await?;
            println!("{}", created.id);
        }
        ReferenceCommand::Update { id, name } => {
            submit_update(service, &id, &ReferenceForm::new(name), notifier, None).await?;
        }
        ReferenceCommand::Delete(args) => {
            delete(console, service, &args).await?;
        }
    }
    Ok(())
}

// ============================================================================
// Contracting authorities
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct AuthorityArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Region id
    #[arg(long)]
    pub region: Option<String>,
}

impl AuthorityArgs {
    fn apply(self, form: &mut AuthorityForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(address) = self.address {
            form.address = address;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if let Some(phone) = self.phone {
            form.phone = phone;
        }
        if let Some(region) = self.region {
            form.region_id = Some(region).filter(|r| !r.trim().is_empty());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AuthorityCommand {
    /// List contracting authorities
    List(ListArgs),
    /// Add a contracting authority
    Create(AuthorityArgs),
    /// Change a contracting authority; omitted fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        fields: AuthorityArgs,
    },
    /// Remove a contracting authority
    Delete(DeleteArgs),
}

pub async fn run_authorities(
    console: &Console,
    service: &ResourceService<Authorities>,
    command: AuthorityCommand,
) -> Result<()> {
    let notifier = console.notifier();
    match command {
        AuthorityCommand::List(args) => {
            let list = console.list_of(service);
            list.open(args.query(console.config.lists.page_size)).await?;
            let mut table = Table::new(&["ID", "Name", "Email", "Phone", "Address"]);
            for authority in list.rows() {
                table.row(vec![
                    authority.id,
                    authority.name,
                    text(authority.email.as_deref()),
                    text(authority.phone.as_deref()),
                    text(authority.address.as_deref()),
                ]);
            }
            print!("{}", render_page(&table, list.pagination(), NO_RECORDS));
        }
        AuthorityCommand::Create(fields) => {
            let mut form = AuthorityForm::default();
            fields.apply(&mut form);
            let created = submit_create(service, &form, notifier, None).await?;
            println!("{}", created.id);
        }
        AuthorityCommand::Update { id, fields } => {
            let current = service.get(&id).await.reported(notifier)?;
            let mut form = AuthorityForm::from_authority(&current);
            fields.apply(&mut form);
            submit_update(service, &id, &form, notifier, None).await?;
        }
        AuthorityCommand::Delete(args) => {
            delete(console, service, &args).await?;
        }
    }
    Ok(())
}

// ============================================================================
// Packages
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct PackageArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    /// Subscription length in days
    #[arg(long)]
    pub days: Option<u32>,
    #[arg(long)]
    pub description: Option<String>,
}

impl PackageArgs {
    fn apply(self, form: &mut PackageForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if self.price.is_some() {
            form.price = self.price;
        }
        if self.days.is_some() {
            form.duration_days = self.days;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PackageCommand {
    /// List subscription packages
    List(ListArgs),
    /// Add a package
    Create(PackageArgs),
    /// Change a package; omitted fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        fields: PackageArgs,
    },
    /// Remove a package
    Delete(DeleteArgs),
}

pub async fn run_packages(
    console: &Console,
    service: &ResourceService<Packages>,
    command: PackageCommand,
) -> Result<()> {
    let notifier = console.notifier();
    let currency = console.config.invoice.currency.as_str();
    match command {
        PackageCommand::List(args) => {
            let list = console.list_of(service);
            list.open(args.query(console.config.lists.page_size)).await?;
            let mut table = Table::new(&["ID", "Name", "Price", "Days", "Description"]);
            for package in list.rows() {
                table.row(vec![
                    package.id,
                    package.name,
                    package
                        .price
                        .map(|p| format_amount(p, currency))
                        .unwrap_or_else(|| "-".to_string()),
                    package
                        .duration_days
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    text(package.description.as_deref()),
                ]);
            }
            print!("{}", render_page(&table, list.pagination(), NO_RECORDS));
        }
        PackageCommand::Create(fields) => {
            let mut form = PackageForm::default();
            fields.apply(&mut form);
            let created = submit_create(service, &form, notifier, None).await?;
            println!("{}", created.id);
        }
        PackageCommand::Update { id, fields } => {
            let current = service.get(&id).await.reported(notifier)?;
            let mut form = PackageForm::from_package(&current);
            fields.apply(&mut form);
            submit_update(service, &id, &form, notifier, None).await?;
        }
        PackageCommand::Delete(args) => {
            delete(console, service, &args).await?;
        }
    }
    Ok(())
}
