//! Shared types for Laurel

pub mod achievement;
pub mod error;
pub mod status;

pub use achievement::{
    Achievement, AchievementPatch, AchievementView, Attachment, Details, NewAchievement,
    NewAttachment,
};
pub use error::{ErrorEnvelope, LaurelError, Result};
pub use status::{AchievementStatus, StatusRecord, Transition};
