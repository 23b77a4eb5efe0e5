//! Database schemas for Laurel
//!
//! MongoDB document structures for achievement content and the directory
//! collections (users, roles, students, lecturers).

mod achievement;
mod lecturer;
pub(crate) mod metadata;
mod role;
mod student;
mod user;

pub use achievement::{AchievementDoc, AttachmentDoc, ACHIEVEMENT_COLLECTION};
pub(crate) use achievement::details_to_document;
pub use lecturer::{LecturerDoc, LECTURER_COLLECTION};
pub use metadata::Metadata;
pub use role::{RoleDoc, ROLE_COLLECTION};
pub use student::{StudentDoc, STUDENT_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
