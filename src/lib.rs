//! Laurel - achievement verification service
//!
//! Students record achievements as drafts and submit them; their academic
//! advisor verifies or rejects the submission. Admins may act on any record.
//!
//! ## Architecture
//!
//! - Content records (title, details, attachments) live in MongoDB
//! - Status records (workflow state and transition timestamps) live in SQLite
//! - The lifecycle manager coordinates both and authorizes every operation
//!
//! ## Modules
//!
//! - `auth` - Token verification, revocation, route gate, authorization evaluator
//! - `config` - CLI and environment configuration
//! - `db` - MongoDB content store and SQLite status store
//! - `directory` - Student, advisor and role lookups
//! - `routes` - HTTP endpoint handlers
//! - `server` - HTTP accept loop and request pipeline
//! - `services` - Lifecycle manager and history projection
//! - `store` - Storage traits and the in-memory content store
//! - `types` - Domain types and errors

pub mod auth;
pub mod config;
pub mod db;
pub mod directory;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use services::AchievementService;
pub use types::{LaurelError, Result};
