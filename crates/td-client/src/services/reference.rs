//! Reference data resources

use crate::forms::reference::{AuthorityDraft, PackageDraft, ReferenceDraft};
use crate::models::{ContractingAuthority, Package, ReferenceItem};
use crate::resource::Resource;

macro_rules! reference_resource {
    ($(#[$doc:meta])* $name:ident, $path:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Resource for $name {
            const PATH: &'static str = $path;
            const LABEL: &'static str = $label;
            type Entity = ReferenceItem;
            type Draft = ReferenceDraft;
        }
    };
}

reference_resource!(
    /// Notice types (contract notice, award notice, ...)
    NoticeTypes, "/notice-types", "Notice type"
);
reference_resource!(
    /// Procurement procedures
    Procedures, "/procedures", "Procedure"
);
reference_resource!(Categories, "/categories", "Category");
reference_resource!(Regions, "/regions", "Region");
reference_resource!(
    /// Countries
    States, "/states", "State"
);
reference_resource!(ContractTypes, "/contract-types", "Contract type");

/// Contracting authorities
#[derive(Debug, Clone, Copy)]
pub struct Authorities;

impl Resource for Authorities {
    const PATH: &'static str = "/contracting-authorities";
    const LABEL: &'static str = "Contracting authority";
    type Entity = ContractingAuthority;
    type Draft = AuthorityDraft;
}

/// Subscription packages
#[derive(Debug, Clone, Copy)]
pub struct Packages;

impl Resource for Packages {
    const PATH: &'static str = "/packages";
    const LABEL: &'static str = "Package";
    type Entity = Package;
    type Draft = PackageDraft;
}
