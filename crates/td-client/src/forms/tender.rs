//! Add/Edit Tender form

use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;

use super::validation::{non_blank, FieldErrors};
use super::Form;
use crate::error::ApiResult;
use crate::models::{ReferenceItem, Tender, MAX_DOCUMENTS};
use crate::resource::IntoBody;
use crate::taxonomy;
use crate::transport::{FormPart, RequestBody};

pub const DOCUMENT_REQUIRED: &str = "At least one document is required for the tender";
pub const TOO_MANY_DOCUMENTS: &str = "A tender can have at most 5 documents";

/// A local file queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Selected category; the name drives the subcategory cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChoice {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct TenderForm {
    pub title: String,
    pub procurement_number: String,
    pub publication_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub procedure_id: Option<String>,
    pub contract_type_id: Option<String>,
    pub notice_type_id: Option<String>,
    pub region_id: Option<String>,
    pub state_id: Option<String>,
    pub contracting_authority_id: Option<String>,
    pub description: String,
    pub price: Option<f64>,
    category: Option<CategoryChoice>,
    sub_category: Option<String>,
    /// References already stored on the server (edit mode)
    existing: Vec<String>,
    uploads: Vec<DocumentUpload>,
}

impl TenderForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill from an existing tender. `categories` resolves the category
    /// name for the subcategory cascade; an unknown id falls back to the
    /// subcategory's parent.
    pub fn from_tender(tender: &Tender, categories: &[ReferenceItem]) -> Self {
        let category = tender.category_id.as_ref().map(|id| CategoryChoice {
            id: id.clone(),
            name: crate::models::name_of(categories, Some(id))
                .filter(|name| !name.trim().is_empty())
                .or_else(|| tender.sub_category.as_deref().and_then(taxonomy::parent_of))
                .unwrap_or_default()
                .to_string(),
        });
        Self {
            title: tender.title.clone(),
            procurement_number: tender.procurement_number.clone(),
            publication_date: tender.publication_date,
            expiry_date: tender.expiry_date,
            procedure_id: tender.procedure_id.clone(),
            contract_type_id: tender.contract_type_id.clone(),
            notice_type_id: tender.notice_type_id.clone(),
            region_id: tender.region_id.clone(),
            state_id: tender.state_id.clone(),
            contracting_authority_id: tender.contracting_authority_id.clone(),
            description: tender.description.clone().unwrap_or_default(),
            price: tender.price,
            category,
            sub_category: tender.sub_category.clone().filter(|s| !s.trim().is_empty()),
            existing: tender.documents().into_iter().map(str::to_string).collect(),
            uploads: Vec::new(),
        }
    }

    pub fn category(&self) -> Option<&CategoryChoice> {
        self.category.as_ref()
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category.as_deref()
    }

    /// Select a category. The current subcategory survives only if it is
    /// listed under the new category.
    pub fn select_category(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let choice = CategoryChoice {
            id: id.into(),
            name: name.into(),
        };
        if let Some(sub) = &self.sub_category {
            if !taxonomy::belongs_to(&choice.name, sub) {
                self.sub_category = None;
            }
        }
        self.category = Some(choice);
    }

    pub fn clear_category(&mut self) {
        self.category = None;
        self.sub_category = None;
    }

    /// Subcategories offered for the selected category.
    pub fn available_sub_categories(&self) -> &'static [&'static str] {
        self.category
            .as_ref()
            .map(|c| taxonomy::subcategories_for(&c.name))
            .unwrap_or(&[])
    }

    pub fn select_sub_category(&mut self, name: &str) -> Result<(), FieldErrors> {
        let category = self
            .category
            .as_ref()
            .ok_or_else(|| FieldErrors::single("subCategory", "Select a category first"))?;
        let canonical = taxonomy::canonical(&category.name, name).ok_or_else(|| {
            FieldErrors::single(
                "subCategory",
                format!("'{}' is not a subcategory of {}", name.trim(), category.name),
            )
        })?;
        self.sub_category = Some(canonical.to_string());
        Ok(())
    }

    pub fn clear_sub_category(&mut self) {
        self.sub_category = None;
    }

    pub fn existing_documents(&self) -> &[String] {
        &self.existing
    }

    pub fn uploads(&self) -> &[DocumentUpload] {
        &self.uploads
    }

    pub fn document_count(&self) -> usize {
        self.existing.len() + self.uploads.len()
    }

    pub fn attach(&mut self, upload: DocumentUpload) -> Result<(), FieldErrors> {
        if self.document_count() >= MAX_DOCUMENTS {
            return Err(FieldErrors::single("documents", TOO_MANY_DOCUMENTS));
        }
        self.uploads.push(upload);
        Ok(())
    }

    /// Drop a stored document from the tender. Returns whether it was attached.
    pub fn detach_existing(&mut self, reference: &str) -> bool {
        let before = self.existing.len();
        self.existing.retain(|r| r != reference);
        before != self.existing.len()
    }

    pub fn remove_upload(&mut self, index: usize) -> Option<DocumentUpload> {
        (index < self.uploads.len()).then(|| self.uploads.remove(index))
    }
}

impl Form for TenderForm {
    type Draft = TenderDraft;

    fn validate(&self) -> Result<TenderDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.document_count() {
            0 => errors.add("documents", DOCUMENT_REQUIRED),
            n if n > MAX_DOCUMENTS => errors.add("documents", TOO_MANY_DOCUMENTS),
            _ => {}
        }

        errors.require("title", &self.title, "Title is required");
        errors.require(
            "procurementNumber",
            &self.procurement_number,
            "Procurement number is required",
        );
        errors.require_some("categoryId", self.category.as_ref(), "Category is required");
        errors.require_some("procedureId", self.procedure_id.as_ref(), "Procedure is required");
        errors.require_some("noticeTypeId", self.notice_type_id.as_ref(), "Notice type is required");
        errors.require_some(
            "contractingAuthorityId",
            self.contracting_authority_id.as_ref(),
            "Contracting authority is required",
        );
        errors.require_some(
            "publicationDate",
            self.publication_date.as_ref(),
            "Publication date is required",
        );
        errors.require_some("expiryDate", self.expiry_date.as_ref(), "Expiry date is required");

        if let (Some(published), Some(expires)) = (self.publication_date, self.expiry_date) {
            if expires < published {
                errors.add("expiryDate", "Expiry date must be after the publication date");
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                errors.add("price", "Price must be a positive amount");
            }
        }
        if let (Some(category), Some(sub)) = (&self.category, &self.sub_category) {
            if !taxonomy::belongs_to(&category.name, sub) {
                errors.add("subCategory", "Subcategory does not belong to the selected category");
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // every required field was checked above
        let (Some(category), Some(publication_date), Some(expiry_date)) =
            (&self.category, self.publication_date, self.expiry_date)
        else {
            return Err(errors);
        };

        Ok(TenderDraft {
            title: self.title.trim().to_string(),
            procurement_number: self.procurement_number.trim().to_string(),
            publication_date,
            expiry_date,
            category_id: category.id.clone(),
            sub_category: self.sub_category.clone(),
            procedure_id: self.procedure_id.clone(),
            contract_type_id: self.contract_type_id.clone(),
            notice_type_id: self.notice_type_id.clone(),
            region_id: self.region_id.clone(),
            state_id: self.state_id.clone(),
            contracting_authority_id: self.contracting_authority_id.clone(),
            description: non_blank(&self.description),
            price: self.price,
            retained: self.existing.clone(),
            uploads: self.uploads.clone(),
        })
    }
}

/// Validated tender, sent as multipart form data
#[derive(Debug, Clone, PartialEq)]
pub struct TenderDraft {
    pub title: String,
    pub procurement_number: String,
    pub publication_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub category_id: String,
    pub sub_category: Option<String>,
    pub procedure_id: Option<String>,
    pub contract_type_id: Option<String>,
    pub notice_type_id: Option<String>,
    pub region_id: Option<String>,
    pub state_id: Option<String>,
    pub contracting_authority_id: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub retained: Vec<String>,
    pub uploads: Vec<DocumentUpload>,
}

impl TenderDraft {
    /// Multipart parts in send order. Kept documents occupy the first
    /// `fileN` slots as their stored reference, new uploads fill the rest.
    pub fn parts(&self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("title", &self.title),
            FormPart::text("procurementNumber", &self.procurement_number),
            FormPart::text("publicationDate", self.publication_date.to_rfc3339()),
            FormPart::text("expiryDate", self.expiry_date.to_rfc3339()),
            FormPart::text("categoryId", &self.category_id),
        ];

        let optional = [
            ("subCategory", self.sub_category.as_ref()),
            ("procedureId", self.procedure_id.as_ref()),
            ("contractTypeId", self.contract_type_id.as_ref()),
            ("noticeTypeId", self.notice_type_id.as_ref()),
            ("regionId", self.region_id.as_ref()),
            ("stateId", self.state_id.as_ref()),
            ("contractingAuthorityId", self.contracting_authority_id.as_ref()),
            ("description", self.description.as_ref()),
        ];
        parts.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| FormPart::text(name, v))),
        );
        if let Some(price) = self.price {
            parts.push(FormPart::text("price", price.to_string()));
        }

        let mut slot = 1;
        for reference in self.retained.iter().take(MAX_DOCUMENTS) {
            parts.push(FormPart::text(format!("file{slot}"), reference));
            slot += 1;
        }
        for upload in &self.uploads {
            if slot > MAX_DOCUMENTS {
                break;
            }
            parts.push(FormPart::file(
                format!("file{slot}"),
                &upload.file_name,
                &upload.mime,
                upload.bytes.clone(),
            ));
            slot += 1;
        }
        parts
    }
}

impl IntoBody for TenderDraft {
    fn into_body(&self) -> ApiResult<RequestBody> {
        Ok(RequestBody::Multipart(self.parts()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::PartValue;
    use td_common::lenient::parse_timestamp;

    fn filled() -> TenderForm {
        let mut form = TenderForm::new();
        form.title = "Supply of hospital beds".into();
        form.procurement_number = "REF-2026-014".into();
        form.publication_date = parse_timestamp("2026-03-01");
        form.expiry_date = parse_timestamp("2026-04-01");
        form.select_category("2", "Goods");
        form.procedure_id = Some("1".into());
        form.notice_type_id = Some("1".into());
        form.contracting_authority_id = Some("4".into());
        form
    }

    #[test]
    fn test_zero_documents_rejected_with_exact_message() {
        let errors = filled().validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first_message(), Some(DOCUMENT_REQUIRED));
    }

    #[test]
    fn test_required_fields() {
        let mut form = TenderForm::new();
        form.attach(DocumentUpload::new("spec.pdf", b"%PDF".to_vec())).unwrap();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("categoryId"), Some("Category is required"));
        assert_eq!(errors.get("expiryDate"), Some("Expiry date is required"));
        assert!(errors.get("documents").is_none());
    }

    #[test]
    fn test_sixth_document_refused() {
        let mut form = filled();
        for i in 0..MAX_DOCUMENTS {
            form.attach(DocumentUpload::new(format!("doc{i}.pdf"), vec![1])).unwrap();
        }
        let err = form.attach(DocumentUpload::new("doc6.pdf", vec![1])).unwrap_err();
        assert_eq!(err.first_message(), Some(TOO_MANY_DOCUMENTS));
        assert_eq!(form.document_count(), MAX_DOCUMENTS);
    }

    #[test]
    fn test_category_change_clears_foreign_subcategory() {
        let mut form = filled();
        form.select_sub_category("it equipment").unwrap();
        assert_eq!(form.sub_category(), Some("IT equipment"));

        // same category keeps it
        form.select_category("2", "Goods");
        assert_eq!(form.sub_category(), Some("IT equipment"));

        form.select_category("3", "Services");
        assert_eq!(form.sub_category(), None);
        assert!(form.available_sub_categories().contains(&"Cleaning"));
        assert!(form.select_sub_category("Fuel").is_err());
    }

    #[test]
    fn test_prefill_with_unknown_category_keeps_subcategory_valid() {
        let tender: Tender = serde_json::from_value(serde_json::json!({
            "id": 8,
            "title": "Laptops for schools",
            "procurementNumber": "REF-2026-031",
            "publicationDate": "2026-03-01",
            "expiryDate": "2026-04-01",
            "categoryId": 99,
            "subCategory": "IT equipment",
            "procedureId": 1,
            "noticeTypeId": 1,
            "contractingAuthorityId": 4,
            "file1": "/uploads/tenders/laptops.pdf"
        }))
        .unwrap();

        let form = TenderForm::from_tender(&tender, &[]);
        assert_eq!(form.category().unwrap().name, "Goods");
        assert_eq!(form.sub_category(), Some("IT equipment"));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_parts_fill_slots_after_retained_documents() {
        let mut form = filled();
        form.existing = vec!["/uploads/tenders/a.pdf".into()];
        form.attach(DocumentUpload::new("b.docx", vec![7, 7])).unwrap();

        let draft = form.validate().unwrap();
        let parts = draft.parts();

        let file1 = parts.iter().find(|p| p.name == "file1").unwrap();
        assert_eq!(file1.value, PartValue::Text("/uploads/tenders/a.pdf".into()));

        let file2 = parts.iter().find(|p| p.name == "file2").unwrap();
        match &file2.value {
            PartValue::File { file_name, mime, bytes } => {
                assert_eq!(file_name, "b.docx");
                assert!(mime.contains("wordprocessingml"));
                assert_eq!(bytes, &vec![7, 7]);
            }
            other => panic!("expected file part, got {other:?}"),
        }
        assert!(parts.iter().all(|p| p.name != "file3"));
    }
}
