//! Achievement content record and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{LaurelError, Result, StatusRecord};

/// Free-form key/value details attached to an achievement
pub type Details = Map<String, Value>;

/// Content record: the descriptive payload of an achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub student_id: String,
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub tags: Vec<String>,
    pub points: i64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    /// Set when the achievement is submitted. A locked record refuses edits.
    #[serde(default)]
    pub locked: bool,
}

/// Attachment metadata. File bytes live in the file storage service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Create payload. Request bodies use snake_case like every response; the
/// camelCase spellings of the two compound keys are still accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAchievement {
    /// Target student. Required for admins, ignored for students.
    #[serde(default, alias = "studentId")]
    pub student_id: Option<String>,
    #[serde(alias = "achievementType")]
    pub achievement_type: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub points: i64,
}

impl NewAchievement {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LaurelError::Validation("title is required".into()));
        }
        if self.achievement_type.trim().is_empty() {
            return Err(LaurelError::Validation("achievement_type is required".into()));
        }
        if self.points < 0 {
            return Err(LaurelError::Validation("points must not be negative".into()));
        }
        Ok(())
    }

    /// Build the content record for `student_id`; the store assigns the id.
    pub fn into_achievement(self, student_id: String, now: DateTime<Utc>) -> Achievement {
        Achievement {
            id: String::new(),
            student_id,
            achievement_type: self.achievement_type,
            title: self.title,
            description: self.description,
            details: self.details,
            tags: self.tags,
            points: self.points,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
            locked: false,
        }
    }
}

/// Update payload. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AchievementPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub details: Option<Details>,
    pub tags: Option<Vec<String>>,
    pub points: Option<i64>,
}

impl AchievementPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.details.is_none()
            && self.tags.is_none()
            && self.points.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(LaurelError::Validation("no fields to update".into()));
        }
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(LaurelError::Validation("title must not be empty".into()));
        }
        if matches!(self.points, Some(p) if p < 0) {
            return Err(LaurelError::Validation("points must not be negative".into()));
        }
        Ok(())
    }

    /// Apply to an in-memory record
    pub fn apply(&self, achievement: &mut Achievement, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            achievement.title = title.clone();
        }
        if let Some(description) = &self.description {
            achievement.description = description.clone();
        }
        if let Some(details) = &self.details {
            achievement.details = details.clone();
        }
        if let Some(tags) = &self.tags {
            achievement.tags = tags.clone();
        }
        if let Some(points) = self.points {
            achievement.points = points;
        }
        achievement.updated_at = now;
    }
}

/// Attachment payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_url: String,
    #[serde(default = "default_file_type")]
    pub file_type: String,
}

fn default_file_type() -> String {
    "application/octet-stream".to_string()
}

impl NewAttachment {
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(LaurelError::Validation("file_name is required".into()));
        }
        if self.file_url.trim().is_empty() {
            return Err(LaurelError::Validation("file_url is required".into()));
        }
        Ok(())
    }

    pub fn into_attachment(self, now: DateTime<Utc>) -> Attachment {
        Attachment {
            file_name: self.file_name,
            file_url: self.file_url,
            file_type: self.file_type,
            uploaded_at: now,
        }
    }
}

/// Content record joined with its status record
#[derive(Debug, Clone, Serialize)]
pub struct AchievementView {
    pub achievement: Achievement,
    pub status: StatusRecord,
}
