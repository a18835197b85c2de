//! TenderDesk admin console
//!
//! Terminal counterpart of the admin web pages:
//! - Sign-in with a persisted session
//! - Tenders with document upload and download
//! - Subscribers, subscription extension and pro-forma invoices
//! - Reference data (packages, categories, regions, ...)

mod commands;
mod console;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use td_client::{taxonomy, Notifier};
use td_config::{AppConfig, ConfigLoader};

use commands::invoice::InvoiceArgs;
use commands::reference::{AuthorityCommand, PackageCommand, ReferenceCommand};
use commands::subscribers::SubscriberCommand;
use commands::tenders::TenderCommand;
use commands::Reported;
use console::{prompt_line, Console, ConsoleNotifier};

/// TenderDesk admin console
#[derive(Parser, Debug)]
#[command(name = "td-admin", version)]
#[command(about = "TenderDesk admin console - tenders, subscribers and reference data")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Serve every request from built-in fixtures instead of the API
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long, short)]
        username: Option<String>,
        #[arg(long, env = "TENDERDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Tenders and their documents
    #[command(subcommand)]
    Tenders(TenderCommand),
    /// Subscriber accounts
    #[command(subcommand)]
    Subscribers(SubscriberCommand),
    /// Subscription packages
    #[command(subcommand)]
    Packages(PackageCommand),
    /// Notice types
    #[command(subcommand)]
    NoticeTypes(ReferenceCommand),
    /// Procurement procedures
    #[command(subcommand)]
    Procedures(ReferenceCommand),
    /// Tender categories
    #[command(subcommand)]
    Categories(ReferenceCommand),
    /// Contracting authorities
    #[command(subcommand)]
    Authorities(AuthorityCommand),
    #[command(subcommand)]
    Regions(ReferenceCommand),
    /// Countries
    #[command(subcommand)]
    States(ReferenceCommand),
    #[command(subcommand)]
    ContractTypes(ReferenceCommand),
    /// Subcategories offered for a category name
    Subcategories { category: String },
    /// Write a pro-forma invoice PDF
    Invoice(InvoiceArgs),
    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print an example configuration file
    Example,
    /// Print the effective configuration as JSON
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    td_common::logging::init_logging("td-admin");

    let args = Args::parse();
    let notifier = Arc::new(ConsoleNotifier::new());

    match run(args, notifier.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "Command failed");
            if !notifier.has_reported_error() {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().context("Failed to load configuration")?;
    if args.mock {
        config.api.mock = true;
    }
    Ok(config)
}

async fn run(args: Args, notifier: Arc<ConsoleNotifier>) -> Result<()> {
    // commands that need neither configuration nor a session
    match &args.command {
        Command::Config(ConfigCommand::Example) => {
            print!("{}", AppConfig::example_toml());
            return Ok(());
        }
        Command::Subcategories { category } => {
            let subcategories = taxonomy::subcategories_for(category);
            if subcategories.is_empty() {
                anyhow::bail!("no subcategories are defined for '{}'", category.trim());
            }
            for name in subcategories {
                println!("{}", name);
            }
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&args)?;
    debug!(base_url = %config.api.base_url, mock = config.api.mock, "Configuration loaded");
    let console = Console::open(config, notifier)?;
    let api = &console.api;

    match args.command {
        Command::Login { username, password } => {
            let username = match username {
                Some(username) => username,
                None => prompt_line("Username")?,
            };
            let password = match password {
                Some(password) => password,
                None => prompt_line("Password")?,
            };
            let user = api
                .auth
                .login(&username, &password)
                .await
                .reported(console.notifier())?;
            console
                .notifier()
                .success(&format!("Signed in as {}", user.username));
        }
        Command::Logout => {
            api.auth.logout().reported(console.notifier())?;
            console.notifier().success("Signed out");
        }
        Command::Whoami => match api.auth.current_user() {
            Some(user) => {
                let detail = [user.email.as_deref(), user.role.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                if detail.is_empty() {
                    println!("{}", user.username);
                } else {
                    println!("{} ({})", user.username, detail);
                }
            }
            None => anyhow::bail!("not signed in, run `td-admin login`"),
        },
        Command::Tenders(command) => commands::tenders::run(&console, command).await?,
        Command::Subscribers(command) => commands::subscribers::run(&console, command).await?,
        Command::Packages(command) => {
            commands::reference::run_packages(&console, &api.packages, command).await?
        }
        Command::Authorities(command) => {
            commands::reference::run_authorities(&console, &api.authorities, command).await?
        }
        Command::NoticeTypes(command) => {
            commands::reference::run(&console, &api.notice_types, command).await?
        }
        Command::Procedures(command) => {
            commands::reference::run(&console, &api.procedures, command).await?
        }
        Command::Categories(command) => {
            commands::reference::run(&console, &api.categories, command).await?
        }
        Command::Regions(command) => commands::reference::run(&console, &api.regions, command).await?,
        Command::States(command) => commands::reference::run(&console, &api.states, command).await?,
        Command::ContractTypes(command) => {
            commands::reference::run(&console, &api.contract_types, command).await?
        }
        Command::Invoice(args) => commands::invoice::run(&console, args).await?,
        Command::Config(ConfigCommand::Show) => {
            println!("{}", serde_json::to_string_pretty(&console.config)?);
        }
        Command::Config(ConfigCommand::Example) | Command::Subcategories { .. } => {}
    }
    Ok(())
}
