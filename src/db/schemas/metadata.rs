//! Common document metadata
//!
//! Creation, update and soft deletion timestamps shared by every collection.

use bson::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Common metadata for all documents
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Metadata {
    /// Soft-deleted documents stay in the collection for audit
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Metadata {
    /// Metadata stamped with the given instant
    pub fn at(now: chrono::DateTime<Utc>) -> Self {
        let now = DateTime::from_chrono(now);
        Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: Some(now),
            created_at: Some(now),
        }
    }
}

/// Convert an optional BSON timestamp, falling back to the Unix epoch
pub(crate) fn to_chrono(value: Option<DateTime>) -> chrono::DateTime<Utc> {
    value.map(|v| v.to_chrono()).unwrap_or_default()
}
