//! Timeline projection of a status record
//!
//! The history is derived from the status record's timestamp fields on every
//! read. Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Achievement, AchievementStatus, StatusRecord};

/// One step of an achievement's workflow history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub status: AchievementStatus,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TimelineEntry {
    fn new(status: AchievementStatus, at: DateTime<Utc>) -> Self {
        Self {
            status,
            at,
            by: None,
            note: None,
        }
    }
}

/// Content record with its derived timeline
#[derive(Debug, Clone, Serialize)]
pub struct AchievementHistory {
    pub achievement: Achievement,
    pub status: AchievementStatus,
    pub history: Vec<TimelineEntry>,
}

/// Project the timeline of `record`.
///
/// Entries come out in workflow order (draft, submitted, verified, rejected)
/// whatever the stored timestamps say. The result always starts with the
/// draft entry.
pub fn project(record: &StatusRecord) -> Vec<TimelineEntry> {
    let mut timeline = vec![TimelineEntry::new(AchievementStatus::Draft, record.created_at)];

    if let Some(submitted_at) = record.submitted_at {
        timeline.push(TimelineEntry::new(AchievementStatus::Submitted, submitted_at));
    }

    if let Some(verified_at) = record.verified_at {
        timeline.push(TimelineEntry {
            by: record.verified_by.clone(),
            ..TimelineEntry::new(AchievementStatus::Verified, verified_at)
        });
    }

    if record.status == AchievementStatus::Rejected {
        if let Some(note) = &record.rejection_note {
            timeline.push(TimelineEntry {
                note: Some(note.clone()),
                ..TimelineEntry::new(AchievementStatus::Rejected, record.updated_at)
            });
        }
    }

    timeline
}
