//! Tender resource
//!
//! Tenders are written as multipart forms (documents ride along as
//! `file1..file5`) and their documents are downloaded through the
//! authenticated client.

use tracing::info;

use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::forms::tender::TenderDraft;
use crate::models::Tender;
use crate::resource::{Resource, ResourceService};

#[derive(Debug, Clone, Copy)]
pub struct Tenders;

impl Resource for Tenders {
    const PATH: &'static str = "/tenders";
    const LABEL: &'static str = "Tender";
    type Entity = Tender;
    type Draft = TenderDraft;
}

impl ResourceService<Tenders> {
    /// Fetch a document by its stored reference (relative path or absolute URL).
    pub async fn download_document(&self, reference: &str) -> ApiResult<Vec<u8>> {
        let bytes = self.client().download(reference).await?;
        info!(reference, size = bytes.len(), "Downloaded tender document");
        Ok(bytes)
    }

    /// Fetch the document in a 1-based slot of a tender.
    pub async fn download_slot(&self, tender: &Tender, slot: usize) -> ApiResult<(String, Vec<u8>)> {
        let reference = tender.document(slot).ok_or_else(|| {
            ApiError::new(
                ErrorKind::NotFound,
                format!("Tender {} has no document in slot {}", tender.id, slot),
            )
        })?;
        let bytes = self.download_document(reference).await?;
        Ok((reference.to_string(), bytes))
    }
}
