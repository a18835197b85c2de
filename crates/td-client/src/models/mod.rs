//! Entities exchanged with the API

pub mod reference;
pub mod subscriber;
pub mod tender;

pub use reference::{name_of, ContractingAuthority, ReferenceItem};
pub use subscriber::{Package, Subscriber};
pub use tender::{Tender, MAX_DOCUMENTS};
