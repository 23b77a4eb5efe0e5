//! MongoDB-backed directory
//!
//! Reads the `students`, `lecturers`, `users` and `roles` collections.

use async_trait::async_trait;
use bson::doc;
use tracing::debug;

use crate::db::schemas::{
    LecturerDoc, RoleDoc, StudentDoc, UserDoc, LECTURER_COLLECTION, ROLE_COLLECTION,
    STUDENT_COLLECTION, USER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::directory::Directory;
use crate::types::Result;

#[derive(Clone)]
pub struct MongoDirectory {
    students: MongoCollection<StudentDoc>,
    lecturers: MongoCollection<LecturerDoc>,
    users: MongoCollection<UserDoc>,
    roles: MongoCollection<RoleDoc>,
}

impl MongoDirectory {
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            students: client.collection(STUDENT_COLLECTION).await?,
            lecturers: client.collection(LECTURER_COLLECTION).await?,
            users: client.collection(USER_COLLECTION).await?,
            roles: client.collection(ROLE_COLLECTION).await?,
        })
    }
}

#[async_trait]
impl Directory for MongoDirectory {
    async fn resolve_student_id(&self, user_id: &str) -> Result<Option<String>> {
        let student = self.students.find_one(doc! { "user_id": user_id }).await?;
        Ok(student.map(|s| s.student_id))
    }

    async fn resolve_advisor_id(&self, user_id: &str) -> Result<Option<String>> {
        let lecturer = self.lecturers.find_one(doc! { "user_id": user_id }).await?;
        Ok(lecturer.map(|l| l.lecturer_id))
    }

    async fn list_advisee_student_ids(&self, advisor_id: &str) -> Result<Vec<String>> {
        let students = self
            .students
            .find_many(doc! { "advisor_id": advisor_id }, Some(doc! { "student_id": 1 }))
            .await?;
        Ok(students.into_iter().map(|s| s.student_id).collect())
    }

    async fn current_role_permissions(&self, user_id: &str) -> Result<Vec<String>> {
        let Some(user) = self
            .users
            .find_one(doc! { "user_id": user_id, "is_active": true })
            .await?
        else {
            debug!("No active user {} in directory", user_id);
            return Ok(Vec::new());
        };

        let role = self.roles.find_one(doc! { "name": user.role.as_str() }).await?;
        Ok(role.map(|r| r.permissions).unwrap_or_default())
    }
}
