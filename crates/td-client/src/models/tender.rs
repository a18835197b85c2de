//! Tender entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use td_common::lenient;

/// Number of document slots a tender carries (`file1` .. `file5`).
pub const MAX_DOCUMENTS: usize = 5;

/// A procurement tender as listed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub procurement_number: String,

    #[serde(default, deserialize_with = "lenient::timestamp_opt")]
    pub publication_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::timestamp_opt")]
    pub expiry_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub file1: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub file2: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub file3: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub file4: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub file5: Option<String>,

    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub category_id: Option<String>,
    /// Subcategory name; subcategories only exist client-side
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub procedure_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub contract_type_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub notice_type_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub region_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub state_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub contracting_authority_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub updated_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tender {
    /// Document slots in order, `None` for empty slots.
    pub fn slots(&self) -> [Option<&str>; MAX_DOCUMENTS] {
        [
            self.file1.as_deref(),
            self.file2.as_deref(),
            self.file3.as_deref(),
            self.file4.as_deref(),
            self.file5.as_deref(),
        ]
    }

    /// References of the attached documents, skipping empty slots.
    pub fn documents(&self) -> Vec<&str> {
        self.slots().into_iter().flatten().collect()
    }

    /// Document in a 1-based slot.
    pub fn document(&self, slot: usize) -> Option<&str> {
        if slot == 0 || slot > MAX_DOCUMENTS {
            return None;
        }
        self.slots()[slot - 1]
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }
}
