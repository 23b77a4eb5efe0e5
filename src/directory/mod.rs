//! Relationship facts owned by the academic directory
//!
//! Which student profile belongs to a user, which lecturer profile belongs to
//! an advisor, who the advisees of an advisor are, and which permission
//! strings a user's role currently grants. Every call reads the backing
//! source fresh; nothing is cached, so a reassigned advisee loses or gains
//! access on the next request.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::types::Result;

pub use memory::StaticDirectory;
pub use mongo::MongoDirectory;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Student id of the student profile owned by `user_id`
    async fn resolve_student_id(&self, user_id: &str) -> Result<Option<String>>;

    /// Lecturer id of the advisor profile owned by `user_id`
    async fn resolve_advisor_id(&self, user_id: &str) -> Result<Option<String>>;

    /// Student ids currently assigned to `advisor_id`
    async fn list_advisee_student_ids(&self, advisor_id: &str) -> Result<Vec<String>>;

    /// Permission strings granted to the role `user_id` currently holds
    async fn current_role_permissions(&self, user_id: &str) -> Result<Vec<String>>;
}
