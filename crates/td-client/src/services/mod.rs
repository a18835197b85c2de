//! Resource services, one per admin page

pub mod auth;
pub mod reference;
pub mod subscribers;
pub mod tenders;

pub use auth::{AuthService, LoginResponse};
pub use reference::{
    Authorities, Categories, ContractTypes, NoticeTypes, Packages, Procedures, Regions, States,
};
pub use subscribers::Subscribers;
pub use tenders::Tenders;

use crate::auth::SessionAuth;
use crate::client::ApiClient;
use crate::resource::ResourceService;

/// Every service the console uses, built over one shared client.
#[derive(Debug, Clone)]
pub struct AdminApi {
    pub auth: AuthService,
    pub tenders: ResourceService<Tenders>,
    pub subscribers: ResourceService<Subscribers>,
    pub packages: ResourceService<Packages>,
    pub notice_types: ResourceService<NoticeTypes>,
    pub procedures: ResourceService<Procedures>,
    pub categories: ResourceService<Categories>,
    pub authorities: ResourceService<Authorities>,
    pub regions: ResourceService<Regions>,
    pub states: ResourceService<States>,
    pub contract_types: ResourceService<ContractTypes>,
}

impl AdminApi {
    pub fn new(client: ApiClient, session: SessionAuth) -> Self {
        Self {
            auth: AuthService::new(client.clone(), session),
            tenders: ResourceService::new(client.clone()),
            subscribers: ResourceService::new(client.clone()),
            packages: ResourceService::new(client.clone()),
            notice_types: ResourceService::new(client.clone()),
            procedures: ResourceService::new(client.clone()),
            categories: ResourceService::new(client.clone()),
            authorities: ResourceService::new(client.clone()),
            regions: ResourceService::new(client.clone()),
            states: ResourceService::new(client.clone()),
            contract_types: ResourceService::new(client),
        }
    }
}
