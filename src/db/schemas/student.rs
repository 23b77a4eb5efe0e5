//! Student profile document

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

pub const STUDENT_COLLECTION: &str = "students";

/// Academic profile linking a user account to a student id and advisor
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StudentDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Account id carried in the token
    pub user_id: String,

    /// Academic student id, the owner key of achievements
    pub student_id: String,

    /// Lecturer id of the assigned academic advisor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_id: Option<String>,
}

impl IntoIndexes for StudentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "user_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_id_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "advisor_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("advisor_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for StudentDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
