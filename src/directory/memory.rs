//! In-memory directory
//!
//! Backs tests and dev mode. Mutations take effect on the next lookup.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::auth::permissions::{
    ACHIEVEMENT_CREATE, ACHIEVEMENT_DELETE, ACHIEVEMENT_READ, ACHIEVEMENT_UPDATE,
    ACHIEVEMENT_VERIFY,
};
use crate::auth::Role;
use crate::directory::Directory;
use crate::types::Result;

#[derive(Debug, Default)]
struct Entries {
    /// user id -> (student id, advisor lecturer id)
    students: HashMap<String, (String, Option<String>)>,
    /// user id -> lecturer id
    advisors: HashMap<String, String>,
    /// user id -> role
    roles: HashMap<String, Role>,
    /// role -> permission strings
    permissions: HashMap<Role, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: RwLock<Entries>,
}

impl StaticDirectory {
    /// Empty directory with no role grants
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the stock grants: students create and edit their own
    /// records, advisors read and review, admins hold everything.
    pub fn with_default_grants() -> Self {
        let dir = Self::new();
        dir.grant(
            Role::Student,
            &[ACHIEVEMENT_CREATE, ACHIEVEMENT_READ, ACHIEVEMENT_UPDATE, ACHIEVEMENT_DELETE],
        );
        dir.grant(Role::Advisor, &[ACHIEVEMENT_READ, ACHIEVEMENT_VERIFY]);
        dir.grant(
            Role::Admin,
            &[
                ACHIEVEMENT_CREATE,
                ACHIEVEMENT_READ,
                ACHIEVEMENT_UPDATE,
                ACHIEVEMENT_DELETE,
                ACHIEVEMENT_VERIFY,
            ],
        );
        dir
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the permission strings of `role`
    pub fn grant(&self, role: Role, permissions: &[&str]) {
        self.write()
            .permissions
            .insert(role, permissions.iter().map(|p| p.to_string()).collect());
    }

    /// Register a student profile for `user_id`
    pub fn add_student(&self, user_id: &str, student_id: &str, advisor_id: Option<&str>) {
        let mut entries = self.write();
        entries.students.insert(
            user_id.to_string(),
            (student_id.to_string(), advisor_id.map(str::to_string)),
        );
        entries.roles.insert(user_id.to_string(), Role::Student);
    }

    /// Register an advisor profile for `user_id`
    pub fn add_advisor(&self, user_id: &str, lecturer_id: &str) {
        let mut entries = self.write();
        entries
            .advisors
            .insert(user_id.to_string(), lecturer_id.to_string());
        entries.roles.insert(user_id.to_string(), Role::Advisor);
    }

    pub fn add_admin(&self, user_id: &str) {
        self.write().roles.insert(user_id.to_string(), Role::Admin);
    }

    /// Reassign (or unassign) the advisor of the student with `student_id`
    pub fn set_advisor(&self, student_id: &str, advisor_id: Option<&str>) {
        let mut entries = self.write();
        for (sid, advisor) in entries.students.values_mut() {
            if sid == student_id {
                *advisor = advisor_id.map(str::to_string);
            }
        }
    }

    /// Change the role a user holds
    pub fn set_role(&self, user_id: &str, role: Role) {
        self.write().roles.insert(user_id.to_string(), role);
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn resolve_student_id(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.read().students.get(user_id).map(|(sid, _)| sid.clone()))
    }

    async fn resolve_advisor_id(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.read().advisors.get(user_id).cloned())
    }

    async fn list_advisee_student_ids(&self, advisor_id: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .read()
            .students
            .values()
            .filter(|(_, advisor)| advisor.as_deref() == Some(advisor_id))
            .map(|(sid, _)| sid.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn current_role_permissions(&self, user_id: &str) -> Result<Vec<String>> {
        let entries = self.read();
        let permissions = entries
            .roles
            .get(user_id)
            .and_then(|role| entries.permissions.get(role))
            .cloned()
            .unwrap_or_default();
        Ok(permissions)
    }
}
