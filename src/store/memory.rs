//! In-memory content store
//!
//! Used by tests and as the dev-mode fallback when MongoDB is unreachable.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use std::sync::RwLock;

use crate::store::ContentStore;
use crate::types::{Achievement, AchievementPatch, Attachment, LaurelError, Result};

/// Content records held in insertion order
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: RwLock<Vec<Achievement>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, deleted ones included
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Achievement>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Achievement>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Live records matching `keep`, newest first. Ties keep the later insert first.
    fn select(&self, keep: impl Fn(&Achievement) -> bool) -> Vec<Achievement> {
        let mut found: Vec<Achievement> = self
            .read()
            .iter()
            .rev()
            .filter(|a| !a.is_deleted && keep(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    fn modify_live<F>(&self, id: &str, f: F) -> Result<Achievement>
    where
        F: FnOnce(&mut Achievement),
    {
        let mut records = self.write();
        let record = live_mut(&mut records, id)?;
        f(record);
        Ok(record.clone())
    }

    fn modify_unlocked<F>(&self, id: &str, f: F) -> Result<Achievement>
    where
        F: FnOnce(&mut Achievement),
    {
        let mut records = self.write();
        let record = live_mut(&mut records, id)?;
        if record.locked {
            return Err(locked(id));
        }
        f(record);
        Ok(record.clone())
    }
}

fn live_mut<'a>(records: &'a mut [Achievement], id: &str) -> Result<&'a mut Achievement> {
    records
        .iter_mut()
        .find(|a| a.id == id && !a.is_deleted)
        .ok_or_else(|| LaurelError::NotFound(format!("achievement {}", id)))
}

fn locked(id: &str) -> LaurelError {
    LaurelError::ConflictOrNotFound(format!("achievement {} is locked for review", id))
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert(&self, mut achievement: Achievement) -> Result<Achievement> {
        let now = Utc::now();
        achievement.id = ObjectId::new().to_hex();
        achievement.created_at = now;
        achievement.updated_at = now;
        achievement.is_deleted = false;

        self.write().push(achievement.clone());
        Ok(achievement)
    }

    async fn get(&self, id: &str) -> Result<Option<Achievement>> {
        Ok(self.read().iter().find(|a| a.id == id).cloned())
    }

    async fn update(&self, id: &str, patch: &AchievementPatch) -> Result<Achievement> {
        let now = Utc::now();
        self.modify_unlocked(id, |a| patch.apply(a, now))
    }

    async fn push_attachment(&self, id: &str, attachment: Attachment) -> Result<Achievement> {
        let now = Utc::now();
        self.modify_unlocked(id, |a| {
            a.attachments.push(attachment);
            a.updated_at = now;
        })
    }

    async fn lock(&self, id: &str) -> Result<()> {
        self.modify_live(id, |a| a.locked = true).map(|_| ())
    }

    async fn unlock(&self, id: &str) -> Result<()> {
        self.modify_live(id, |a| a.locked = false).map(|_| ())
    }

    async fn soft_delete(&self, id: &str) -> Result<()> {
        let now = Utc::now();
        self.modify_live(id, |a| {
            a.is_deleted = true;
            a.updated_at = now;
        })
        .map(|_| ())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.write().retain(|a| a.id != id);
        Ok(())
    }

    async fn find_by_owners(&self, student_ids: &[String]) -> Result<Vec<Achievement>> {
        Ok(self.select(|a| student_ids.contains(&a.student_id)))
    }

    async fn find_all(&self) -> Result<Vec<Achievement>> {
        Ok(self.select(|_| true))
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Achievement>> {
        Ok(self.select(|a| ids.contains(&a.id)))
    }
}
