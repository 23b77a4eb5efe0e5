//! Achievement services

pub mod history;
pub mod lifecycle;

pub use history::{project, AchievementHistory, TimelineEntry};
pub use lifecycle::AchievementService;
