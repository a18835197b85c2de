//! TenderDesk admin client
//!
//! Typed access to the tender-listing REST API plus the controllers an admin
//! console is built from.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use td_client::{AdminApi, ApiClient, ClientConfig, SessionAuth};
//! use td_common::ListQuery;
//!
//! # async fn example() -> td_client::Result<()> {
//! let (session, _navigator) = SessionAuth::in_memory();
//! let client = ApiClient::new(ClientConfig::new("http://localhost:5000/api"), Arc::new(session.clone()))?;
//! let api = AdminApi::new(client, session);
//!
//! api.auth.login("admin", "secret").await?;
//! let page = api.tenders.list(&ListQuery::new(1, 10)).await?;
//! println!("{} tenders", page.total);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod debounce;
pub mod download;
pub mod envelope;
pub mod error;
pub mod forms;
pub mod invoice;
pub mod list;
pub mod mock;
pub mod models;
pub mod notify;
pub mod resource;
pub mod services;
pub mod taxonomy;
pub mod transport;

pub use auth::{
    AuthContext, FileSessionStore, MemorySessionStore, Navigator, RecordingNavigator, SessionAuth,
    SessionStore, SessionUser,
};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, Error, ErrorKind, Result};
pub use forms::{submit_create, submit_update, FieldErrors, Form};
pub use list::{ListController, ListSource, ListState, Pagination};
pub use mock::MockTransport;
pub use notify::{Notifier, RecordingNotifier, SilentNotifier, Toast, ToastLevel};
pub use resource::{Resource, ResourceService};
pub use services::AdminApi;
pub use transport::{HttpTransport, Transport};

pub use td_common::{ListQuery, Page};
