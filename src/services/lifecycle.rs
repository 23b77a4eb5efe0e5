//! Achievement lifecycle manager
//!
//! Orchestrates every operation on an achievement across the two stores. Each
//! operation runs in the same order:
//!
//! 1. validate input that needs no store access
//! 2. load the status record (existence check)
//! 3. authorize through [`decide`]
//! 4. check the state machine precondition
//! 5. mutate
//!
//! Transitions race through the status store's conditional update. Content
//! edits race against submit through the content lock, which submit takes
//! before moving the status. A caller that loses either race gets
//! `ConflictOrNotFound` and has to re-fetch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::auth::{decide, Actor, DenyReason, Operation, ResourceFacts, Role, Subject};
use crate::directory::Directory;
use crate::services::history::{project, AchievementHistory};
use crate::store::{ContentStore, StatusStore};
use crate::types::{
    Achievement, AchievementPatch, AchievementStatus, AchievementView, LaurelError,
    NewAchievement, NewAttachment, Result, StatusRecord, Transition,
};

/// Achievement lifecycle manager
#[derive(Clone)]
pub struct AchievementService {
    content: Arc<dyn ContentStore>,
    status: Arc<dyn StatusStore>,
    directory: Arc<dyn Directory>,
}

impl AchievementService {
    pub fn new(
        content: Arc<dyn ContentStore>,
        status: Arc<dyn StatusStore>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            content,
            status,
            directory,
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Create a draft achievement.
    ///
    /// Students always create for their own profile; a `student_id` in the
    /// payload is ignored. Admins must name the target student. Advisors
    /// cannot create.
    pub async fn create(&self, actor: &Actor, payload: NewAchievement) -> Result<AchievementView> {
        payload.validate()?;

        let owner = match actor.role {
            Role::Student => {
                let own = self
                    .directory
                    .resolve_student_id(&actor.user_id)
                    .await?
                    .ok_or_else(|| self.deny(actor, Operation::Create, DenyReason::AccessDenied))?;
                if payload.student_id.as_deref().is_some_and(|target| target != own) {
                    debug!(
                        "Ignoring explicit student id from student {}",
                        actor.user_id
                    );
                }
                own
            }
            Role::Admin => match payload.student_id.as_deref().map(str::trim) {
                Some(target) if !target.is_empty() => target.to_string(),
                _ => {
                    return Err(LaurelError::Validation(
                        "student_id is required when creating on behalf of a student".into(),
                    ))
                }
            },
            Role::Advisor => {
                return Err(self.deny(actor, Operation::Create, DenyReason::AccessDenied));
            }
        };

        self.authorize(actor, Operation::Create, &owner, None).await?;

        let achievement = payload.into_achievement(owner, Utc::now());
        let saved = self.content.insert(achievement).await?;

        let status = match self.status.create_draft(&saved.id, &saved.student_id).await {
            Ok(status) => status,
            Err(e) => {
                // Without a status record the content record is an orphan
                if let Err(cleanup) = self.content.remove(&saved.id).await {
                    error!(
                        "Failed to remove orphan achievement {} after status write error: {}",
                        saved.id, cleanup
                    );
                }
                return Err(LaurelError::Store(format!(
                    "status record for {} not written: {}",
                    saved.id, e
                )));
            }
        };

        info!(
            "Achievement {} created as draft for student {} by {}",
            saved.id, saved.student_id, actor.user_id
        );

        Ok(AchievementView {
            achievement: saved,
            status,
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Load one achievement the actor may read
    pub async fn get(&self, actor: &Actor, achievement_id: &str) -> Result<AchievementView> {
        let record = self.load_status(achievement_id).await?;
        self.authorize_record(actor, Operation::Read, &record).await?;

        if record.status == AchievementStatus::Deleted {
            return Err(not_found(achievement_id));
        }

        let achievement = self.load_content(&record).await?;
        Ok(AchievementView {
            achievement,
            status: record,
        })
    }

    /// Achievements visible to the actor, newest first, optionally only
    /// those currently in `status`
    pub async fn list(
        &self,
        actor: &Actor,
        status: Option<AchievementStatus>,
    ) -> Result<Vec<AchievementView>> {
        if status == Some(AchievementStatus::Deleted) {
            return Err(LaurelError::Validation(
                "deleted achievements cannot be listed".into(),
            ));
        }

        // None means every student
        let owners = match actor.role {
            Role::Student => {
                let own = self
                    .directory
                    .resolve_student_id(&actor.user_id)
                    .await?
                    .ok_or_else(|| self.deny(actor, Operation::Read, DenyReason::AccessDenied))?;
                Some(vec![own])
            }
            Role::Advisor => {
                let advisor_id = self
                    .directory
                    .resolve_advisor_id(&actor.user_id)
                    .await?
                    .ok_or_else(|| self.deny(actor, Operation::Read, DenyReason::AccessDenied))?;
                let advisees = self.directory.list_advisee_student_ids(&advisor_id).await?;
                if advisees.is_empty() {
                    return Ok(Vec::new());
                }
                Some(advisees)
            }
            Role::Admin => None,
        };

        let contents = match (status, owners.as_deref()) {
            (Some(wanted), owners) => {
                let ids = self
                    .status
                    .achievement_ids_with_status(wanted, owners)
                    .await?;
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                self.content.find_by_ids(&ids).await?
            }
            (None, Some(owners)) => self.content.find_by_owners(owners).await?,
            (None, None) => self.content.find_all().await?,
        };

        let mut views = self.join_status(contents).await?;
        if let Some(wanted) = status {
            // The status may have moved between the two reads
            views.retain(|v| v.status.status == wanted);
        }
        Ok(views)
    }

    /// Achievement with its derived workflow timeline
    pub async fn history(&self, actor: &Actor, achievement_id: &str) -> Result<AchievementHistory> {
        let view = self.get(actor, achievement_id).await?;
        Ok(AchievementHistory {
            history: project(&view.status),
            status: view.status.status,
            achievement: view.achievement,
        })
    }

    // ========================================================================
    // Content edits (draft only)
    // ========================================================================

    pub async fn update(
        &self,
        actor: &Actor,
        achievement_id: &str,
        patch: AchievementPatch,
    ) -> Result<AchievementView> {
        patch.validate()?;

        let record = self.load_status(achievement_id).await?;
        self.authorize_record(actor, Operation::Update, &record).await?;
        require_draft(Operation::Update, &record)?;

        let achievement = self
            .content
            .update(achievement_id, &patch)
            .await
            .map_err(|e| content_gone(achievement_id, e))?;
        debug!("Achievement {} updated by {}", achievement_id, actor.user_id);

        Ok(AchievementView {
            achievement,
            status: record,
        })
    }

    /// Record attachment metadata. The file itself is already stored.
    pub async fn add_attachment(
        &self,
        actor: &Actor,
        achievement_id: &str,
        attachment: NewAttachment,
    ) -> Result<AchievementView> {
        attachment.validate()?;

        let record = self.load_status(achievement_id).await?;
        self.authorize_record(actor, Operation::Attach, &record).await?;
        require_draft(Operation::Attach, &record)?;

        let achievement = self
            .content
            .push_attachment(achievement_id, attachment.into_attachment(Utc::now()))
            .await
            .map_err(|e| content_gone(achievement_id, e))?;
        debug!(
            "Attachment added to achievement {} by {}",
            achievement_id, actor.user_id
        );

        Ok(AchievementView {
            achievement,
            status: record,
        })
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub async fn submit(&self, actor: &Actor, achievement_id: &str) -> Result<AchievementView> {
        self.apply_transition(actor, achievement_id, Operation::Submit, Transition::Submit)
            .await
    }

    pub async fn verify(&self, actor: &Actor, achievement_id: &str) -> Result<AchievementView> {
        let transition = Transition::Verify {
            verified_by: actor.user_id.clone(),
        };
        self.apply_transition(actor, achievement_id, Operation::Verify, transition)
            .await
    }

    /// Reject a submitted achievement. An empty note fails before anything
    /// else is checked.
    pub async fn reject(
        &self,
        actor: &Actor,
        achievement_id: &str,
        note: &str,
    ) -> Result<AchievementView> {
        let note = note.trim();
        if note.is_empty() {
            return Err(LaurelError::Validation("rejection note is required".into()));
        }

        let transition = Transition::Reject {
            note: note.to_string(),
        };
        self.apply_transition(actor, achievement_id, Operation::Reject, transition)
            .await
    }

    /// Soft delete a draft. The status record moves first; the content record
    /// is flagged afterwards and kept for audit.
    pub async fn delete(&self, actor: &Actor, achievement_id: &str) -> Result<()> {
        let record = self.load_status(achievement_id).await?;
        self.authorize_record(actor, Operation::Delete, &record).await?;
        require_transition(Operation::Delete, &record, &Transition::Delete)?;

        self.status
            .transition(achievement_id, &Transition::Delete)
            .await?;

        if let Err(e) = self.content.soft_delete(achievement_id).await {
            error!(
                "Achievement {} marked deleted but content flag failed: {}",
                achievement_id, e
            );
            return Err(e);
        }

        info!("Achievement {} deleted by {}", achievement_id, actor.user_id);
        Ok(())
    }

    async fn apply_transition(
        &self,
        actor: &Actor,
        achievement_id: &str,
        operation: Operation,
        transition: Transition,
    ) -> Result<AchievementView> {
        let record = self.load_status(achievement_id).await?;
        self.authorize_record(actor, operation, &record).await?;
        require_transition(operation, &record, &transition)?;

        // Content is frozen before the status leaves draft, so an edit that
        // already passed its draft check cannot land afterwards
        let freezes = transition == Transition::Submit;
        if freezes {
            self.content
                .lock(achievement_id)
                .await
                .map_err(|e| content_gone(achievement_id, e))?;
        }

        let updated = match self.status.transition(achievement_id, &transition).await {
            Ok(updated) => updated,
            Err(e) => {
                if freezes {
                    self.release_lock(achievement_id).await;
                }
                return Err(e);
            }
        };
        info!(
            "Achievement {} {} -> {} by {}",
            achievement_id,
            transition.from(),
            transition.to(),
            actor.user_id
        );

        let achievement = self.load_content(&updated).await?;
        Ok(AchievementView {
            achievement,
            status: updated,
        })
    }

    /// Undo a submit lock whose status transition did not happen. A record
    /// that left draft meanwhile keeps its lock.
    async fn release_lock(&self, achievement_id: &str) {
        match self.status.get(achievement_id).await {
            Ok(Some(record)) if record.status == AchievementStatus::Draft => {
                if let Err(e) = self.content.unlock(achievement_id).await {
                    error!(
                        "Achievement {} is draft but stays locked: {}",
                        achievement_id, e
                    );
                }
            }
            Ok(_) => {}
            Err(e) => error!(
                "Could not check achievement {} after failed submit, lock kept: {}",
                achievement_id, e
            ),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_status(&self, achievement_id: &str) -> Result<StatusRecord> {
        match self.status.get(achievement_id).await? {
            Some(record) => Ok(record),
            None => Err(self.missing_status(achievement_id).await),
        }
    }

    /// Error for an id whose status record is absent. A content record
    /// without its status record is refused as inconsistent.
    async fn missing_status(&self, achievement_id: &str) -> LaurelError {
        match self.content.get(achievement_id).await {
            Ok(Some(_)) => {
                warn!("Achievement {} has content but no status record", achievement_id);
                LaurelError::Inconsistent(format!(
                    "content record {} has no status record",
                    achievement_id
                ))
            }
            Ok(None) => not_found(achievement_id),
            Err(e) => e,
        }
    }

    /// Content record for a live status record
    async fn load_content(&self, record: &StatusRecord) -> Result<Achievement> {
        let achievement = self
            .content
            .get(&record.achievement_id)
            .await?
            .ok_or_else(|| {
                LaurelError::Inconsistent(format!(
                    "status record {} has no content record",
                    record.achievement_id
                ))
            })?;

        if achievement.is_deleted {
            return Err(not_found(&record.achievement_id));
        }
        if achievement.student_id != record.student_id {
            return Err(LaurelError::Inconsistent(format!(
                "owner mismatch for achievement {}",
                record.achievement_id
            )));
        }
        Ok(achievement)
    }

    /// Attach status records to content records, dropping any that do not pair
    async fn join_status(&self, contents: Vec<Achievement>) -> Result<Vec<AchievementView>> {
        let ids: Vec<String> = contents.iter().map(|a| a.id.clone()).collect();
        let mut statuses: HashMap<String, StatusRecord> = self
            .status
            .find_by_achievement_ids(&ids)
            .await?
            .into_iter()
            .map(|s| (s.achievement_id.clone(), s))
            .collect();

        let mut views = Vec::with_capacity(contents.len());
        for achievement in contents {
            match statuses.remove(&achievement.id) {
                Some(status) if status.status == AchievementStatus::Deleted => {
                    warn!(
                        "Skipping achievement {}: status deleted but content live",
                        achievement.id
                    );
                }
                Some(status) => views.push(AchievementView {
                    achievement,
                    status,
                }),
                None => {
                    warn!(
                        "Skipping achievement {}: no status record",
                        achievement.id
                    );
                }
            }
        }
        Ok(views)
    }

    /// Build the authorization subject from fresh directory facts
    async fn subject(&self, actor: &Actor) -> Result<Subject> {
        Ok(match actor.role {
            Role::Admin => Subject::Admin,
            Role::Student => Subject::Student {
                student_id: self.directory.resolve_student_id(&actor.user_id).await?,
            },
            Role::Advisor => {
                let advisees: HashSet<String> =
                    match self.directory.resolve_advisor_id(&actor.user_id).await? {
                        Some(advisor_id) => self
                            .directory
                            .list_advisee_student_ids(&advisor_id)
                            .await?
                            .into_iter()
                            .collect(),
                        None => HashSet::new(),
                    };
                Subject::Advisor { advisees }
            }
        })
    }

    async fn authorize(
        &self,
        actor: &Actor,
        operation: Operation,
        owner_student_id: &str,
        status: Option<AchievementStatus>,
    ) -> Result<()> {
        let subject = self.subject(actor).await?;
        let facts = ResourceFacts::new(owner_student_id, status);
        match decide(operation, &subject, &facts).into_result() {
            Ok(()) => Ok(()),
            Err(LaurelError::Forbidden(reason)) => Err(self.deny(actor, operation, reason)),
            Err(other) => Err(other),
        }
    }

    async fn authorize_record(
        &self,
        actor: &Actor,
        operation: Operation,
        record: &StatusRecord,
    ) -> Result<()> {
        self.authorize(actor, operation, &record.student_id, Some(record.status))
            .await
    }

    fn deny(&self, actor: &Actor, operation: Operation, reason: DenyReason) -> LaurelError {
        warn!(
            "Denied {} ({}) to {}: {}",
            operation, actor.role, actor.user_id, reason
        );
        LaurelError::Forbidden(reason)
    }
}

fn not_found(achievement_id: &str) -> LaurelError {
    LaurelError::NotFound(format!("achievement {}", achievement_id))
}

/// A live status record whose content write found nothing to touch
fn content_gone(achievement_id: &str, err: LaurelError) -> LaurelError {
    match err {
        LaurelError::NotFound(_) => LaurelError::Inconsistent(format!(
            "status record {} has no live content record",
            achievement_id
        )),
        other => other,
    }
}

/// Content edits are only allowed in draft
fn require_draft(operation: Operation, record: &StatusRecord) -> Result<()> {
    if record.status.is_editable() {
        return Ok(());
    }
    Err(LaurelError::InvalidTransition {
        action: operation,
        current: record.status,
        requested: AchievementStatus::Draft,
    })
}

fn require_transition(
    operation: Operation,
    record: &StatusRecord,
    transition: &Transition,
) -> Result<()> {
    if record.status == transition.from() {
        return Ok(());
    }
    Err(LaurelError::InvalidTransition {
        action: operation,
        current: record.status,
        requested: transition.to(),
    })
}
