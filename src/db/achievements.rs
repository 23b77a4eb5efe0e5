//! MongoDB-backed content store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use tracing::debug;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{details_to_document, AchievementDoc, AttachmentDoc, ACHIEVEMENT_COLLECTION};
use crate::store::ContentStore;
use crate::types::{Achievement, AchievementPatch, Attachment, LaurelError, Result};

/// Content records in the `achievements` collection
#[derive(Clone)]
pub struct MongoContentStore {
    collection: MongoCollection<AchievementDoc>,
}

impl MongoContentStore {
    pub async fn new(client: &MongoClient) -> Result<Self> {
        let collection = client.collection(ACHIEVEMENT_COLLECTION).await?;
        Ok(Self { collection })
    }

    fn newest_first() -> Document {
        doc! { "metadata.created_at": -1, "_id": -1 }
    }

    /// Apply an edit to an unlocked record, telling apart a locked record
    /// from one that is gone
    async fn edit(&self, id: &str, update: Document) -> Result<Achievement> {
        let oid = object_id(id).ok_or_else(|| not_found(id))?;
        if let Some(doc) = self
            .collection
            .update_live_returning(editable(oid), update)
            .await?
        {
            return Ok(doc.into_achievement());
        }

        match self.collection.find_one(doc! { "_id": oid }).await? {
            Some(doc) if doc.locked => Err(LaurelError::ConflictOrNotFound(format!(
                "achievement {} is locked for review",
                id
            ))),
            _ => Err(not_found(id)),
        }
    }

    async fn set_locked(&self, id: &str, locked: bool) -> Result<()> {
        let oid = object_id(id).ok_or_else(|| not_found(id))?;
        let update = doc! {
            "$set": { "locked": locked, "metadata.updated_at": DateTime::now() }
        };
        let result = self.collection.update_live(doc! { "_id": oid }, update).await?;
        if result.matched_count == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

/// Parse a hex id. Malformed ids cannot name a stored record.
fn object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

fn not_found(id: &str) -> LaurelError {
    LaurelError::NotFound(format!("achievement {}", id))
}

/// Filter matching a record that still accepts edits
fn editable(oid: ObjectId) -> Document {
    doc! { "_id": oid, "locked": { "$ne": true } }
}

fn patch_update(patch: &AchievementPatch) -> Result<Document> {
    let mut set = doc! { "metadata.updated_at": DateTime::now() };
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(description) = &patch.description {
        set.insert("description", description.as_str());
    }
    if let Some(details) = &patch.details {
        set.insert("details", details_to_document(details)?);
    }
    if let Some(tags) = &patch.tags {
        set.insert("tags", tags.clone());
    }
    if let Some(points) = patch.points {
        set.insert("points", points);
    }
    Ok(doc! { "$set": set })
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn insert(&self, achievement: Achievement) -> Result<Achievement> {
        let mut doc = AchievementDoc::from_achievement(achievement)?;
        let id = self.collection.insert_one(doc.clone()).await?;
        debug!("Inserted achievement {}", id);

        // insert_one stamps metadata on its own copy; reload for the stored view
        match self.collection.find_one_any(doc! { "_id": id }).await? {
            Some(stored) => Ok(stored.into_achievement()),
            None => {
                doc._id = Some(id);
                Ok(doc.into_achievement())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Achievement>> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        let found = self.collection.find_one_any(doc! { "_id": oid }).await?;
        Ok(found.map(AchievementDoc::into_achievement))
    }

    async fn update(&self, id: &str, patch: &AchievementPatch) -> Result<Achievement> {
        self.edit(id, patch_update(patch)?).await
    }

    async fn push_attachment(&self, id: &str, attachment: Attachment) -> Result<Achievement> {
        let attachment = bson::to_bson(&AttachmentDoc::from(attachment))?;
        let update = doc! {
            "$push": { "attachments": attachment },
            "$set": { "metadata.updated_at": DateTime::now() },
        };
        self.edit(id, update).await
    }

    async fn lock(&self, id: &str) -> Result<()> {
        self.set_locked(id, true).await
    }

    async fn unlock(&self, id: &str) -> Result<()> {
        self.set_locked(id, false).await
    }

    async fn soft_delete(&self, id: &str) -> Result<()> {
        let oid = object_id(id).ok_or_else(|| not_found(id))?;
        let result = self.collection.soft_delete(doc! { "_id": oid }).await?;
        if result.matched_count == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        if let Some(oid) = object_id(id) {
            self.collection.delete_one(doc! { "_id": oid }).await?;
        }
        Ok(())
    }

    async fn find_by_owners(&self, student_ids: &[String]) -> Result<Vec<Achievement>> {
        let docs = self
            .collection
            .find_many(
                doc! { "student_id": { "$in": student_ids.to_vec() } },
                Some(Self::newest_first()),
            )
            .await?;
        Ok(docs.into_iter().map(AchievementDoc::into_achievement).collect())
    }

    async fn find_all(&self) -> Result<Vec<Achievement>> {
        let docs = self
            .collection
            .find_many(doc! {}, Some(Self::newest_first()))
            .await?;
        Ok(docs.into_iter().map(AchievementDoc::into_achievement).collect())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Achievement>> {
        let oids: Vec<ObjectId> = ids.iter().filter_map(|id| object_id(id)).collect();
        if oids.is_empty() {
            return Ok(Vec::new());
        }
        let docs = self
            .collection
            .find_many(doc! { "_id": { "$in": oids } }, Some(Self::newest_first()))
            .await?;
        Ok(docs.into_iter().map(AchievementDoc::into_achievement).collect())
    }
}
