//! Database layer for Laurel
//!
//! - MongoDB holds achievement content and the directory collections
//! - SQLite holds status records

pub mod achievements;
pub mod mongo;
pub mod schemas;
pub mod status;

pub use achievements::MongoContentStore;
pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
pub use status::SqliteStatusStore;
