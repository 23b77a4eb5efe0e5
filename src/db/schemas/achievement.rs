//! Achievement content document

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::metadata::to_chrono;
use crate::db::schemas::Metadata;
use crate::types::{Achievement, Attachment, Details, Result};

/// Collection name for achievement content records
pub const ACHIEVEMENT_COLLECTION: &str = "achievements";

/// Content record as stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AchievementDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning student (academic student id, not the user id)
    pub student_id: String,

    pub achievement_type: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Type-specific fields (competition level, publication venue, ...)
    #[serde(default)]
    pub details: Document,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub points: i64,

    #[serde(default)]
    pub attachments: Vec<AttachmentDoc>,

    /// Frozen for review once submitted
    #[serde(default)]
    pub locked: bool,
}

/// Attachment metadata embedded in an achievement
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AttachmentDoc {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime,
}

impl From<Attachment> for AttachmentDoc {
    fn from(attachment: Attachment) -> Self {
        Self {
            file_name: attachment.file_name,
            file_url: attachment.file_url,
            file_type: attachment.file_type,
            uploaded_at: DateTime::from_chrono(attachment.uploaded_at),
        }
    }
}

impl From<AttachmentDoc> for Attachment {
    fn from(doc: AttachmentDoc) -> Self {
        Self {
            file_name: doc.file_name,
            file_url: doc.file_url,
            file_type: doc.file_type,
            uploaded_at: doc.uploaded_at.to_chrono(),
        }
    }
}

impl AchievementDoc {
    /// Build a new document from a content record. Id and metadata are
    /// assigned on insert.
    pub fn from_achievement(achievement: Achievement) -> Result<Self> {
        Ok(Self {
            _id: None,
            metadata: Metadata::at(achievement.created_at),
            student_id: achievement.student_id,
            achievement_type: achievement.achievement_type,
            title: achievement.title,
            description: achievement.description,
            details: details_to_document(&achievement.details)?,
            tags: achievement.tags,
            points: achievement.points,
            attachments: achievement
                .attachments
                .into_iter()
                .map(AttachmentDoc::from)
                .collect(),
            locked: achievement.locked,
        })
    }

    pub fn into_achievement(self) -> Achievement {
        Achievement {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            student_id: self.student_id,
            achievement_type: self.achievement_type,
            title: self.title,
            description: self.description,
            details: document_to_details(self.details),
            tags: self.tags,
            points: self.points,
            attachments: self.attachments.into_iter().map(Attachment::from).collect(),
            created_at: to_chrono(self.metadata.created_at),
            updated_at: to_chrono(self.metadata.updated_at),
            is_deleted: self.metadata.is_deleted,
            locked: self.locked,
        }
    }
}

pub(crate) fn details_to_document(details: &Details) -> Result<Document> {
    Ok(bson::to_document(details)?)
}

fn document_to_details(document: Document) -> Details {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Details::new(),
    }
}

impl IntoIndexes for AchievementDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "student_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("student_id_index".to_string())
                        .build(),
                ),
            ),
            // Listings are newest first
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for AchievementDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
