//! Achievement lifecycle integration tests
//!
//! Drives the lifecycle manager over the in-memory content store, an
//! in-memory SQLite status store and a static directory:
//! - create / submit / verify / reject end to end
//! - draft-only edits and soft deletion
//! - per-role listing
//! - racing transitions and partial create failure
//! - edits racing a submit

use std::sync::Arc;

use async_trait::async_trait;
use laurel::auth::{Actor, DenyReason};
use laurel::db::SqliteStatusStore;
use laurel::directory::StaticDirectory;
use laurel::store::{ContentStore, MemoryContentStore, StatusStore};
use laurel::types::{
    Achievement, AchievementPatch, AchievementStatus, AchievementView, Attachment, Details,
    LaurelError, NewAchievement, NewAttachment, Result, StatusRecord, Transition,
};
use laurel::AchievementService;
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    service: AchievementService,
    content: Arc<MemoryContentStore>,
    status: Arc<SqliteStatusStore>,
    directory: Arc<StaticDirectory>,
}

/// S-1 and S-3 are advised by L-1, S-2 by L-2. L-3 has no advisees.
fn harness() -> Harness {
    let directory = Arc::new(StaticDirectory::with_default_grants());
    directory.add_student("u-dina", "S-1", Some("L-1"));
    directory.add_student("u-bayu", "S-2", Some("L-2"));
    directory.add_student("u-sari", "S-3", Some("L-1"));
    directory.add_advisor("u-lecturer-1", "L-1");
    directory.add_advisor("u-lecturer-2", "L-2");
    directory.add_advisor("u-lecturer-3", "L-3");
    directory.add_admin("u-admin");

    let content = Arc::new(MemoryContentStore::new());
    let status = Arc::new(SqliteStatusStore::open_in_memory().unwrap());
    let service = AchievementService::new(content.clone(), status.clone(), directory.clone());

    Harness {
        service,
        content,
        status,
        directory,
    }
}

fn dina() -> Actor {
    Actor::student("u-dina")
}

fn bayu() -> Actor {
    Actor::student("u-bayu")
}

fn advisor_of_dina() -> Actor {
    Actor::advisor("u-lecturer-1")
}

fn unrelated_advisor() -> Actor {
    Actor::advisor("u-lecturer-2")
}

fn admin() -> Actor {
    Actor::admin("u-admin")
}

fn payload(title: &str) -> NewAchievement {
    let mut details = Details::new();
    details.insert("level".into(), serde_json::json!("regional"));
    NewAchievement {
        student_id: None,
        achievement_type: "competition".into(),
        title: title.into(),
        description: "Team event".into(),
        details,
        tags: vec!["robotics".into()],
        points: 25,
    }
}

fn ids(views: Vec<AchievementView>) -> Vec<String> {
    views.into_iter().map(|v| v.achievement.id).collect()
}

async fn draft_for(h: &Harness, actor: &Actor, title: &str) -> String {
    h.service
        .create(actor, payload(title))
        .await
        .unwrap()
        .achievement
        .id
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn test_create_submit_verify_and_read_back() {
    let h = harness();

    let created = h.service.create(&dina(), payload("Robotics cup")).await.unwrap();
    assert_eq!(created.status.status, AchievementStatus::Draft);
    assert_eq!(created.achievement.student_id, "S-1");
    let id = created.achievement.id.clone();

    let submitted = h.service.submit(&dina(), &id).await.unwrap();
    assert_eq!(submitted.status.status, AchievementStatus::Submitted);
    assert!(submitted.status.submitted_at.is_some());

    let verified = h.service.verify(&advisor_of_dina(), &id).await.unwrap();
    assert_eq!(verified.status.status, AchievementStatus::Verified);
    assert!(verified.status.verified_at.is_some());
    assert_eq!(verified.status.verified_by.as_deref(), Some("u-lecturer-1"));

    let read = h.service.get(&dina(), &id).await.unwrap();
    assert_eq!(read.achievement.title, "Robotics cup");
    assert_eq!(read.status.status, AchievementStatus::Verified);

    let denied = h.service.get(&unrelated_advisor(), &id).await;
    assert!(matches!(denied, Err(LaurelError::Forbidden(_))));

    let history = h.service.history(&dina(), &id).await.unwrap();
    let steps: Vec<_> = history.history.iter().map(|e| e.status).collect();
    assert_eq!(
        steps,
        vec![
            AchievementStatus::Draft,
            AchievementStatus::Submitted,
            AchievementStatus::Verified
        ]
    );
}

#[tokio::test]
async fn test_admin_create_requires_student_id() {
    let h = harness();

    let result = h.service.create(&admin(), payload("Paper")).await;
    assert!(matches!(result, Err(LaurelError::Validation(_))));

    let mut blank = payload("Paper");
    blank.student_id = Some("  ".into());
    let result = h.service.create(&admin(), blank).await;
    assert!(matches!(result, Err(LaurelError::Validation(_))));

    assert!(h.content.is_empty());
    assert_eq!(h.status.count().unwrap(), 0);
}

#[tokio::test]
async fn test_admin_creates_on_behalf_of_student() {
    let h = harness();
    let mut body = payload("Paper");
    body.student_id = Some("S-2".into());

    let view = h.service.create(&admin(), body).await.unwrap();
    assert_eq!(view.achievement.student_id, "S-2");

    // The owner sees it, and may act on it
    assert_ok!(h.service.get(&bayu(), &view.achievement.id).await);
    assert_ok!(h.service.submit(&bayu(), &view.achievement.id).await);
}

#[tokio::test]
async fn test_soft_deleted_draft_reads_as_not_found() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Chess").await;

    h.service.delete(&dina(), &id).await.unwrap();

    let result = h.service.get(&dina(), &id).await;
    assert!(matches!(result, Err(LaurelError::NotFound(_))));
    assert!(matches!(
        h.service.history(&dina(), &id).await,
        Err(LaurelError::NotFound(_))
    ));
    assert!(h.service.list(&dina(), None).await.unwrap().is_empty());

    // Both records are kept for audit
    let record = h.status.get(&id).await.unwrap().unwrap();
    assert_eq!(record.status, AchievementStatus::Deleted);
    assert!(h.content.get(&id).await.unwrap().unwrap().is_deleted);
}

// =============================================================================
// Draft-only edits
// =============================================================================

#[tokio::test]
async fn test_edit_after_submit_fails_and_changes_nothing() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Hackathon").await;
    h.service.submit(&dina(), &id).await.unwrap();

    let before = h.service.get(&dina(), &id).await.unwrap();

    let patch = AchievementPatch {
        title: Some("Hackathon (winner)".into()),
        points: Some(100),
        ..Default::default()
    };
    for actor in [dina(), admin()] {
        let result = h.service.update(&actor, &id, patch.clone()).await;
        match result {
            Err(LaurelError::InvalidTransition { current, .. }) => {
                assert_eq!(current, AchievementStatus::Submitted)
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    let attachment = NewAttachment {
        file_name: "forged.pdf".into(),
        file_url: "https://files.example/forged.pdf".into(),
        file_type: "application/pdf".into(),
    };
    let result = h.service.add_attachment(&dina(), &id, attachment).await;
    assert!(matches!(result, Err(LaurelError::InvalidTransition { .. })));

    let delete = h.service.delete(&dina(), &id).await;
    assert!(matches!(delete, Err(LaurelError::InvalidTransition { .. })));

    let after = h.service.get(&dina(), &id).await.unwrap();
    assert_eq!(after.achievement, before.achievement);
    assert_eq!(after.status, before.status);
}

#[tokio::test]
async fn test_draft_edits_and_attachments() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Hackathon").await;

    let patch = AchievementPatch {
        description: Some("48h, team of four".into()),
        ..Default::default()
    };
    let updated = h.service.update(&dina(), &id, patch).await.unwrap();
    assert_eq!(updated.achievement.description, "48h, team of four");
    assert_eq!(updated.achievement.title, "Hackathon");

    let attachment = NewAttachment {
        file_name: "certificate.pdf".into(),
        file_url: "https://files.example/certificate.pdf".into(),
        file_type: "application/pdf".into(),
    };
    let attached = h.service.add_attachment(&admin(), &id, attachment).await.unwrap();
    assert_eq!(attached.achievement.attachments.len(), 1);
    assert_eq!(attached.achievement.attachments[0].file_name, "certificate.pdf");
}

#[tokio::test]
async fn test_other_student_cannot_touch_draft() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Chess").await;

    let patch = AchievementPatch {
        title: Some("Mine now".into()),
        ..Default::default()
    };
    assert!(matches!(
        h.service.update(&bayu(), &id, patch).await,
        Err(LaurelError::Forbidden(DenyReason::NotOwner))
    ));
    assert!(matches!(
        h.service.submit(&bayu(), &id).await,
        Err(LaurelError::Forbidden(DenyReason::NotOwner))
    ));
    assert!(matches!(
        h.service.get(&bayu(), &id).await,
        Err(LaurelError::Forbidden(DenyReason::NotOwner))
    ));
}

// =============================================================================
// Review
// =============================================================================

#[tokio::test]
async fn test_reject_needs_note_whatever_the_role_or_status() {
    let h = harness();
    let draft = draft_for(&h, &dina(), "Draft").await;
    let submitted = draft_for(&h, &dina(), "Submitted").await;
    h.service.submit(&dina(), &submitted).await.unwrap();

    for actor in [dina(), advisor_of_dina(), unrelated_advisor(), admin()] {
        for id in [draft.as_str(), submitted.as_str(), "no-such-achievement"] {
            for note in ["", "   "] {
                let result = h.service.reject(&actor, id, note).await;
                assert!(
                    matches!(result, Err(LaurelError::Validation(_))),
                    "{:?} rejecting {} with {:?}",
                    actor,
                    id,
                    note
                );
            }
        }
    }

    let record = h.status.get(&submitted).await.unwrap().unwrap();
    assert_eq!(record.status, AchievementStatus::Submitted);
}

#[tokio::test]
async fn test_reject_records_note_in_history() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Essay").await;
    h.service.submit(&dina(), &id).await.unwrap();

    let rejected = h
        .service
        .reject(&advisor_of_dina(), &id, "Certificate is not legible")
        .await
        .unwrap();
    assert_eq!(rejected.status.status, AchievementStatus::Rejected);
    assert_eq!(
        rejected.status.rejection_note.as_deref(),
        Some("Certificate is not legible")
    );

    let history = h.service.history(&dina(), &id).await.unwrap();
    let last = history.history.last().unwrap();
    assert_eq!(last.status, AchievementStatus::Rejected);
    assert_eq!(last.note.as_deref(), Some("Certificate is not legible"));

    // Rejection is terminal for this workflow
    let again = h.service.submit(&dina(), &id).await;
    assert!(matches!(again, Err(LaurelError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_unrelated_advisor_cannot_review() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Debate").await;
    h.service.submit(&dina(), &id).await.unwrap();

    assert!(matches!(
        h.service.verify(&unrelated_advisor(), &id).await,
        Err(LaurelError::Forbidden(DenyReason::NotAdvisorOfOwner))
    ));
    assert!(matches!(
        h.service.reject(&unrelated_advisor(), &id, "no").await,
        Err(LaurelError::Forbidden(DenyReason::NotAdvisorOfOwner))
    ));
    // Advisors never edit, even for their advisees
    assert!(matches!(
        h.service.submit(&advisor_of_dina(), &id).await,
        Err(LaurelError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_advisee_removal_takes_effect_on_next_call() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Olympiad").await;
    h.service.submit(&dina(), &id).await.unwrap();

    assert_ok!(h.service.get(&advisor_of_dina(), &id).await);

    h.directory.set_advisor("S-1", Some("L-2"));
    let result = h.service.verify(&advisor_of_dina(), &id).await;
    assert!(matches!(
        result,
        Err(LaurelError::Forbidden(DenyReason::NotAdvisorOfOwner))
    ));

    // The new advisor picks it up straight away
    let verified = h.service.verify(&unrelated_advisor(), &id).await.unwrap();
    assert_eq!(verified.status.verified_by.as_deref(), Some("u-lecturer-2"));
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_listing_per_role() {
    let h = harness();
    let dina_first = draft_for(&h, &dina(), "first").await;
    let bayu_only = draft_for(&h, &bayu(), "bayu").await;
    let sari_only = draft_for(&h, &Actor::student("u-sari"), "sari").await;
    let dina_second = draft_for(&h, &dina(), "second").await;

    let own: Vec<_> = h
        .service
        .list(&dina(), None)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.achievement.id)
        .collect();
    assert_eq!(own, vec![dina_second.clone(), dina_first.clone()]);

    let advisees: Vec<_> = h
        .service
        .list(&advisor_of_dina(), None)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.achievement.id)
        .collect();
    assert_eq!(advisees.len(), 3);
    assert!(advisees.contains(&sari_only));
    assert!(!advisees.contains(&bayu_only));

    let empty = h.service.list(&Actor::advisor("u-lecturer-3"), None).await.unwrap();
    assert!(empty.is_empty());

    let all: Vec<_> = h
        .service
        .list(&admin(), None)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.achievement.id)
        .collect();
    assert_eq!(all, vec![dina_second, sari_only, bayu_only, dina_first]);
}

#[tokio::test]
async fn test_content_without_status_is_refused() {
    let h = harness();
    let listed_id = draft_for(&h, &dina(), "listed").await;

    // Content written, status never written
    let orphan = payload("orphan").into_achievement("S-1".into(), chrono::Utc::now());
    let orphan = h.content.insert(orphan).await.unwrap();

    let listed: Vec<_> = h
        .service
        .list(&dina(), None)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.achievement.id)
        .collect();
    assert_eq!(listed, vec![listed_id]);

    let result = h.service.get(&dina(), &orphan.id).await;
    assert!(matches!(result, Err(LaurelError::Inconsistent(_))));

    // Mutations report the same error kind as reads
    let patch = AchievementPatch {
        title: Some("renamed".into()),
        ..Default::default()
    };
    assert!(matches!(
        h.service.update(&dina(), &orphan.id, patch).await,
        Err(LaurelError::Inconsistent(_))
    ));
    assert!(matches!(
        h.service.submit(&dina(), &orphan.id).await,
        Err(LaurelError::Inconsistent(_))
    ));
    assert!(matches!(
        h.service.delete(&dina(), &orphan.id).await,
        Err(LaurelError::Inconsistent(_))
    ));
    assert!(matches!(
        h.service.submit(&dina(), "no-such-achievement").await,
        Err(LaurelError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_listing_filtered_by_status() {
    let h = harness();
    let sari = Actor::student("u-sari");
    let dina_draft = draft_for(&h, &dina(), "draft").await;
    let dina_submitted = draft_for(&h, &dina(), "submitted").await;
    let sari_submitted = draft_for(&h, &sari, "sari").await;
    let bayu_submitted = draft_for(&h, &bayu(), "bayu").await;
    for (actor, id) in [
        (dina(), &dina_submitted),
        (sari, &sari_submitted),
        (bayu(), &bayu_submitted),
    ] {
        h.service.submit(&actor, id).await.unwrap();
    }

    let submitted = Some(AchievementStatus::Submitted);

    let own = h.service.list(&dina(), submitted).await.unwrap();
    assert_eq!(ids(own), vec![dina_submitted.clone()]);
    let own_drafts = h.service.list(&dina(), Some(AchievementStatus::Draft)).await.unwrap();
    assert_eq!(ids(own_drafts), vec![dina_draft]);

    let queue = h.service.list(&advisor_of_dina(), submitted).await.unwrap();
    assert_eq!(ids(queue), vec![sari_submitted.clone(), dina_submitted.clone()]);
    let nobody = h.service.list(&Actor::advisor("u-lecturer-3"), submitted).await.unwrap();
    assert!(nobody.is_empty());

    let all = h.service.list(&admin(), submitted).await.unwrap();
    assert!(all.iter().all(|v| v.status.status == AchievementStatus::Submitted));
    assert_eq!(ids(all), vec![bayu_submitted, sari_submitted, dina_submitted]);
    let verified = h.service.list(&admin(), Some(AchievementStatus::Verified)).await.unwrap();
    assert!(verified.is_empty());

    assert!(matches!(
        h.service.list(&admin(), Some(AchievementStatus::Deleted)).await,
        Err(LaurelError::Validation(_))
    ));
}

// =============================================================================
// Concurrency and partial failure
// =============================================================================

/// Yields after every status read so two callers interleave between the
/// precondition check and the conditional update
struct YieldingStatusStore {
    inner: Arc<SqliteStatusStore>,
}

#[async_trait]
impl StatusStore for YieldingStatusStore {
    async fn create_draft(&self, achievement_id: &str, student_id: &str) -> Result<StatusRecord> {
        self.inner.create_draft(achievement_id, student_id).await
    }

    async fn get(&self, achievement_id: &str) -> Result<Option<StatusRecord>> {
        let record = self.inner.get(achievement_id).await;
        tokio::task::yield_now().await;
        record
    }

    async fn transition(&self, achievement_id: &str, transition: &Transition) -> Result<StatusRecord> {
        self.inner.transition(achievement_id, transition).await
    }

    async fn find_by_achievement_ids(&self, ids: &[String]) -> Result<Vec<StatusRecord>> {
        self.inner.find_by_achievement_ids(ids).await
    }

    async fn achievement_ids_with_status(
        &self,
        status: AchievementStatus,
        student_ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        self.inner.achievement_ids_with_status(status, student_ids).await
    }
}

#[tokio::test]
async fn test_racing_submits_exactly_one_wins() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Race").await;

    let racing = AchievementService::new(
        h.content.clone(),
        Arc::new(YieldingStatusStore {
            inner: h.status.clone(),
        }),
        h.directory.clone(),
    );

    let (dina_actor, admin_actor) = (dina(), admin());
    let (first, second) = tokio::join!(
        racing.submit(&dina_actor, &id),
        racing.submit(&admin_actor, &id)
    );

    let outcomes = [first, second];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(LaurelError::ConflictOrNotFound(_))))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);

    let record = h.status.get(&id).await.unwrap().unwrap();
    assert_eq!(record.status, AchievementStatus::Submitted);
}

/// Refuses every status write
struct BrokenStatusStore;

#[async_trait]
impl StatusStore for BrokenStatusStore {
    async fn create_draft(&self, _: &str, _: &str) -> Result<StatusRecord> {
        Err(LaurelError::Store("database is locked".into()))
    }

    async fn get(&self, _: &str) -> Result<Option<StatusRecord>> {
        Ok(None)
    }

    async fn transition(&self, _: &str, _: &Transition) -> Result<StatusRecord> {
        Err(LaurelError::Store("database is locked".into()))
    }

    async fn find_by_achievement_ids(&self, _: &[String]) -> Result<Vec<StatusRecord>> {
        Ok(Vec::new())
    }

    async fn achievement_ids_with_status(
        &self,
        _: AchievementStatus,
        _: Option<&[String]>,
    ) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_failed_status_write_removes_orphan_content() {
    let h = harness();
    let service = AchievementService::new(
        h.content.clone(),
        Arc::new(BrokenStatusStore),
        h.directory.clone(),
    );

    let err = assert_err!(service.create(&dina(), payload("Lost")).await);
    assert!(matches!(err, LaurelError::Store(_)));
    assert!(h.content.is_empty());
}

/// Holds content edits until released, so a submit can run between an
/// edit's draft check and its content write
struct GatedContentStore {
    inner: Arc<MemoryContentStore>,
    gate: Arc<Notify>,
}

#[async_trait]
impl ContentStore for GatedContentStore {
    async fn insert(&self, achievement: Achievement) -> Result<Achievement> {
        self.inner.insert(achievement).await
    }

    async fn get(&self, id: &str) -> Result<Option<Achievement>> {
        self.inner.get(id).await
    }

    async fn update(&self, id: &str, patch: &AchievementPatch) -> Result<Achievement> {
        self.gate.notified().await;
        self.inner.update(id, patch).await
    }

    async fn push_attachment(&self, id: &str, attachment: Attachment) -> Result<Achievement> {
        self.gate.notified().await;
        self.inner.push_attachment(id, attachment).await
    }

    async fn lock(&self, id: &str) -> Result<()> {
        self.inner.lock(id).await
    }

    async fn unlock(&self, id: &str) -> Result<()> {
        self.inner.unlock(id).await
    }

    async fn soft_delete(&self, id: &str) -> Result<()> {
        self.inner.soft_delete(id).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.inner.remove(id).await
    }

    async fn find_by_owners(&self, student_ids: &[String]) -> Result<Vec<Achievement>> {
        self.inner.find_by_owners(student_ids).await
    }

    async fn find_all(&self) -> Result<Vec<Achievement>> {
        self.inner.find_all().await
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Achievement>> {
        self.inner.find_by_ids(ids).await
    }
}

#[tokio::test]
async fn test_edits_racing_a_submit_cannot_land() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Hackathon").await;

    let gate = Arc::new(Notify::new());
    let editing = AchievementService::new(
        Arc::new(GatedContentStore {
            inner: h.content.clone(),
            gate: gate.clone(),
        }),
        h.status.clone(),
        h.directory.clone(),
    );

    let patch = AchievementPatch {
        title: Some("Hackathon (winner)".into()),
        ..Default::default()
    };
    let attachment = NewAttachment {
        file_name: "forged.pdf".into(),
        file_url: "https://files.example/forged.pdf".into(),
        file_type: "application/pdf".into(),
    };

    // Both edits pass their draft check and wait; the submit then completes
    let (edit_actor, attach_actor) = (dina(), dina());
    let (edit, attach, submit) = tokio::join!(
        editing.update(&edit_actor, &id, patch),
        editing.add_attachment(&attach_actor, &id, attachment),
        async {
            let submitted = h.service.submit(&dina(), &id).await;
            gate.notify_waiters();
            submitted
        }
    );

    assert_ok!(submit);
    assert!(matches!(edit, Err(LaurelError::ConflictOrNotFound(_))));
    assert!(matches!(attach, Err(LaurelError::ConflictOrNotFound(_))));

    let stored = h.content.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Hackathon");
    assert!(stored.attachments.is_empty());
    assert!(stored.locked);
    let record = h.status.get(&id).await.unwrap().unwrap();
    assert_eq!(record.status, AchievementStatus::Submitted);
}

/// Reads work, every transition fails
struct FailingTransitions {
    inner: Arc<SqliteStatusStore>,
}

#[async_trait]
impl StatusStore for FailingTransitions {
    async fn create_draft(&self, achievement_id: &str, student_id: &str) -> Result<StatusRecord> {
        self.inner.create_draft(achievement_id, student_id).await
    }

    async fn get(&self, achievement_id: &str) -> Result<Option<StatusRecord>> {
        self.inner.get(achievement_id).await
    }

    async fn transition(&self, _: &str, _: &Transition) -> Result<StatusRecord> {
        Err(LaurelError::Store("disk I/O error".into()))
    }

    async fn find_by_achievement_ids(&self, ids: &[String]) -> Result<Vec<StatusRecord>> {
        self.inner.find_by_achievement_ids(ids).await
    }

    async fn achievement_ids_with_status(
        &self,
        status: AchievementStatus,
        student_ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        self.inner.achievement_ids_with_status(status, student_ids).await
    }
}

#[tokio::test]
async fn test_failed_submit_leaves_draft_editable() {
    let h = harness();
    let id = draft_for(&h, &dina(), "Essay").await;
    let failing = AchievementService::new(
        h.content.clone(),
        Arc::new(FailingTransitions {
            inner: h.status.clone(),
        }),
        h.directory.clone(),
    );

    let err = assert_err!(failing.submit(&dina(), &id).await);
    assert!(matches!(err, LaurelError::Store(_)));
    assert!(!h.content.get(&id).await.unwrap().unwrap().locked);

    let patch = AchievementPatch {
        title: Some("Essay, revised".into()),
        ..Default::default()
    };
    let updated = h.service.update(&dina(), &id, patch).await.unwrap();
    assert_eq!(updated.achievement.title, "Essay, revised");
}
