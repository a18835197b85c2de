//! Reference data: notice types, procedures, categories, regions, states,
//! contract types and contracting authorities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use td_common::lenient;

/// A plain `id` + `name` record.
///
/// Fields the console does not use are kept in `extra` so an edit never
/// drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceItem {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(alias = "title")]
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReferenceItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Issuing body of a tender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractingAuthority {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient::id_opt")]
    pub region_id: Option<String>,
}

/// Find a record's name by id in a loaded option list.
pub fn name_of<'a>(items: &'a [ReferenceItem], id: Option<&str>) -> Option<&'a str> {
    let id = id?;
    items
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.name.as_str())
}
