//! Achievement workflow status
//!
//! The status record is the authoritative workflow state of an achievement.
//! It lives in the relational store, separate from the mutable content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::LaurelError;

/// Workflow status of an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementStatus {
    Draft,
    Submitted,
    Verified,
    Rejected,
    Deleted,
}

impl AchievementStatus {
    pub const ALL: [AchievementStatus; 5] = [
        AchievementStatus::Draft,
        AchievementStatus::Submitted,
        AchievementStatus::Verified,
        AchievementStatus::Rejected,
        AchievementStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementStatus::Draft => "draft",
            AchievementStatus::Submitted => "submitted",
            AchievementStatus::Verified => "verified",
            AchievementStatus::Rejected => "rejected",
            AchievementStatus::Deleted => "deleted",
        }
    }

    /// Whether content may still be edited in this status
    pub fn is_editable(&self) -> bool {
        matches!(self, AchievementStatus::Draft)
    }
}

impl fmt::Display for AchievementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementStatus {
    type Err = LaurelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AchievementStatus::Draft),
            "submitted" => Ok(AchievementStatus::Submitted),
            "verified" => Ok(AchievementStatus::Verified),
            "rejected" => Ok(AchievementStatus::Rejected),
            "deleted" => Ok(AchievementStatus::Deleted),
            other => Err(LaurelError::Inconsistent(format!(
                "unknown achievement status '{}'",
                other
            ))),
        }
    }
}

/// A state-machine edge applied to an existing status record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Submit,
    Verify { verified_by: String },
    Reject { note: String },
    Delete,
}

impl Transition {
    /// Status the record must currently hold for this edge to apply
    pub fn from(&self) -> AchievementStatus {
        match self {
            Transition::Submit | Transition::Delete => AchievementStatus::Draft,
            Transition::Verify { .. } | Transition::Reject { .. } => AchievementStatus::Submitted,
        }
    }

    /// Status the record holds after the edge
    pub fn to(&self) -> AchievementStatus {
        match self {
            Transition::Submit => AchievementStatus::Submitted,
            Transition::Verify { .. } => AchievementStatus::Verified,
            Transition::Reject { .. } => AchievementStatus::Rejected,
            Transition::Delete => AchievementStatus::Deleted,
        }
    }
}

/// Status record: one per achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    /// Id of the content record this status belongs to
    pub achievement_id: String,
    /// Owning student, duplicated from the content record for authorization
    pub student_id: String,
    pub status: AchievementStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
