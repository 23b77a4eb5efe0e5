//! Actor roles
//!
//! Roles arrive as strings in token claims. They are parsed once at the edge
//! into a closed enum; anything unrecognised never reaches the lifecycle code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Advisor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "Student"),
            Role::Advisor => write!(f, "Advisor"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// Error for role strings outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts the canonical names plus the legacy directory names
    /// ("Mahasiswa", "Dosen Wali") still present in older role tables.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Student" | "student" | "Mahasiswa" => Ok(Role::Student),
            "Advisor" | "advisor" | "Dosen Wali" => Ok(Role::Advisor),
            "Admin" | "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// An authenticated caller: user identity plus role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn student(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Student)
    }

    pub fn advisor(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Advisor)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }
}
