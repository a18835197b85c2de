//! Reference data forms

use serde::Serialize;

use super::validation::{email_pattern, non_blank, phone_pattern, FieldErrors};
use super::Form;
use crate::json_draft;
use crate::models::{ContractingAuthority, Package, ReferenceItem};

pub const MAX_NAME_LEN: usize = 255;

fn check_name(errors: &mut FieldErrors, name: &str) {
    if errors.require("name", name, "Name is required") {
        errors.max_len("name", name, MAX_NAME_LEN, "Name must be at most 255 characters");
    }
}

/// Name-only form shared by notice types, procedures, categories, regions,
/// states and contract types
#[derive(Debug, Clone, Default)]
pub struct ReferenceForm {
    pub name: String,
}

impl ReferenceForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn from_item(item: &ReferenceItem) -> Self {
        Self::new(item.name.clone())
    }
}

impl Form for ReferenceForm {
    type Draft = ReferenceDraft;

    fn validate(&self) -> Result<ReferenceDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);
        errors.into_result(ReferenceDraft {
            name: self.name.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceDraft {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorityForm {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub region_id: Option<String>,
}

impl AuthorityForm {
    pub fn from_authority(authority: &ContractingAuthority) -> Self {
        Self {
            name: authority.name.clone(),
            address: authority.address.clone().unwrap_or_default(),
            email: authority.email.clone().unwrap_or_default(),
            phone: authority.phone.clone().unwrap_or_default(),
            region_id: authority.region_id.clone(),
        }
    }
}

impl Form for AuthorityForm {
    type Draft = AuthorityDraft;

    fn validate(&self) -> Result<AuthorityDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);

        let email = non_blank(&self.email);
        if email.as_deref().is_some_and(|e| !email_pattern().is_match(e)) {
            errors.add("email", "Email address is invalid");
        }
        let phone = non_blank(&self.phone);
        if phone.as_deref().is_some_and(|p| !phone_pattern().is_match(p)) {
            errors.add("phone", "Phone number is invalid");
        }

        errors.into_result(AuthorityDraft {
            name: self.name.trim().to_string(),
            address: non_blank(&self.address),
            email,
            phone,
            region_id: self.region_id.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityDraft {
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub region_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PackageForm {
    pub name: String,
    pub price: Option<f64>,
    pub duration_days: Option<u32>,
    pub description: String,
}

impl PackageForm {
    pub fn from_package(package: &Package) -> Self {
        Self {
            name: package.name.clone(),
            price: package.price,
            duration_days: package.duration_days,
            description: package.description.clone().unwrap_or_default(),
        }
    }
}

impl Form for PackageForm {
    type Draft = PackageDraft;

    fn validate(&self) -> Result<PackageDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);

        match self.price {
            None => errors.add("price", "Price is required"),
            Some(p) if !p.is_finite() || p < 0.0 => errors.add("price", "Price must be a positive amount"),
            Some(_) => {}
        }
        match self.duration_days {
            None => errors.add("durationDays", "Duration is required"),
            Some(0) => errors.add("durationDays", "Duration must be at least one day"),
            Some(_) => {}
        }

        errors.into_result(PackageDraft {
            name: self.name.trim().to_string(),
            price: self.price.unwrap_or_default(),
            duration_days: self.duration_days.unwrap_or_default(),
            description: non_blank(&self.description),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDraft {
    pub name: String,
    pub price: f64,
    pub duration_days: u32,
    pub description: Option<String>,
}

json_draft!(ReferenceDraft, AuthorityDraft, PackageDraft);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert_eq!(
            ReferenceForm::new("  ").validate().unwrap_err().first_message(),
            Some("Name is required")
        );
        assert!(ReferenceForm::new("x".repeat(255)).validate().is_ok());
        assert_eq!(
            ReferenceForm::new("x".repeat(256)).validate().unwrap_err().first_message(),
            Some("Name must be at most 255 characters")
        );
        assert_eq!(ReferenceForm::new(" Open procedure ").validate().unwrap().name, "Open procedure");
    }

    #[test]
    fn test_authority_optional_contacts() {
        let form = AuthorityForm {
            name: "Ministry of Health".into(),
            email: "not-an-email".into(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err().get("email"), Some("Email address is invalid"));

        let draft = AuthorityForm { email: String::new(), ..form }.validate().unwrap();
        assert_eq!(draft.email, None);
    }

    #[test]
    fn test_package_requires_price_and_duration() {
        let errors = PackageForm { name: "Basic".into(), ..Default::default() }
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("price"), Some("Price is required"));
        assert_eq!(errors.get("durationDays"), Some("Duration is required"));

        let draft = PackageForm {
            name: "Annual".into(),
            price: Some(120.0),
            duration_days: Some(365),
            description: String::new(),
        }
        .validate()
        .unwrap();
        assert_eq!(draft.duration_days, 365);
    }
}
