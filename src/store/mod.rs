//! Storage seams for the two achievement records
//!
//! The content record (descriptive payload) and the status record (workflow
//! state) live in different stores. Neither store knows about the other; the
//! lifecycle manager coordinates writes across them.
//!
//! Implementations:
//! - [`crate::db::MongoContentStore`] - MongoDB content records
//! - [`memory::MemoryContentStore`] - in-process content records (tests, dev mode)
//! - [`crate::db::SqliteStatusStore`] - SQLite status records

pub mod memory;

use async_trait::async_trait;

use crate::types::{
    Achievement, AchievementPatch, AchievementStatus, Attachment, Result, StatusRecord, Transition,
};

pub use memory::MemoryContentStore;

/// Content record store. Has no knowledge of workflow status.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a new record; the store assigns `id` and timestamps
    async fn insert(&self, achievement: Achievement) -> Result<Achievement>;

    /// Load a record by id, including soft-deleted ones (flagged `is_deleted`)
    async fn get(&self, id: &str) -> Result<Option<Achievement>>;

    /// Apply a patch to a live, unlocked record. `NotFound` if absent or
    /// deleted, `ConflictOrNotFound` if locked.
    async fn update(&self, id: &str, patch: &AchievementPatch) -> Result<Achievement>;

    /// Append attachment metadata to a live, unlocked record. Fails like
    /// [`ContentStore::update`].
    async fn push_attachment(&self, id: &str, attachment: Attachment) -> Result<Achievement>;

    /// Freeze a live record against edits. Locking a locked record is a no-op.
    async fn lock(&self, id: &str) -> Result<()>;

    /// Lift the lock again. Only used when a submit could not be recorded.
    async fn unlock(&self, id: &str) -> Result<()>;

    /// Flag a record deleted. The record is kept for audit.
    async fn soft_delete(&self, id: &str) -> Result<()>;

    /// Physically remove a record. Only used to clean up an orphan whose
    /// status record could not be written.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Live records owned by any of `student_ids`, newest first
    async fn find_by_owners(&self, student_ids: &[String]) -> Result<Vec<Achievement>>;

    /// All live records, newest first
    async fn find_all(&self) -> Result<Vec<Achievement>>;

    /// Live records with the given ids, newest first
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Achievement>>;
}

/// Status record store with conditional transitions
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Create the draft status record for a freshly written content record
    async fn create_draft(&self, achievement_id: &str, student_id: &str) -> Result<StatusRecord>;

    async fn get(&self, achievement_id: &str) -> Result<Option<StatusRecord>>;

    /// Apply `transition` only if the current status equals `transition.from()`.
    /// Zero matching rows fails with `ConflictOrNotFound`.
    async fn transition(&self, achievement_id: &str, transition: &Transition)
        -> Result<StatusRecord>;

    /// Bulk read of status records for the given achievements
    async fn find_by_achievement_ids(&self, achievement_ids: &[String])
        -> Result<Vec<StatusRecord>>;

    /// Ids of achievements in `status`, optionally limited to the given
    /// owners. An empty owner set matches nothing.
    async fn achievement_ids_with_status(
        &self,
        status: AchievementStatus,
        student_ids: Option<&[String]>,
    ) -> Result<Vec<String>>;
}
