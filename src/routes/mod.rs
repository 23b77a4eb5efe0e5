//! HTTP routes for Laurel

pub mod achievements;
pub mod auth_routes;
pub mod health;
pub mod response;

pub use achievements::{execute, match_route, Reply, Route, ACHIEVEMENTS_PREFIX};
pub use auth_routes::{handle_logout, LOGOUT_PATH};
pub use health::health_check;
pub use response::{error_response, json_response, not_found_response, success_response, FullBody};
