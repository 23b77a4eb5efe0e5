//! Resource-level authorization
//!
//! `decide` answers "may this actor perform this operation on this specific
//! achievement". It is a pure function over facts the caller has already
//! resolved (the actor's student id, or the advisor's current advisee list),
//! so it never touches a store and never caches relationships.
//!
//! This is separate from the coarse route gate in [`crate::auth::permissions`],
//! which only answers whether a role may call an endpoint at all.
//!
//! Rules, in order:
//! - Admin: allowed for every operation, on any student's achievements.
//! - Student: allowed only on achievements they own, and never to verify or
//!   reject (including their own).
//! - Advisor: allowed to read, verify and reject, only when the owner is in
//!   their current advisee list.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::types::{AchievementStatus, LaurelError, Result};

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Attach,
    Delete,
    Submit,
    Verify,
    Reject,
}

impl Operation {
    /// Review operations are reserved for advisors and admins
    pub fn is_review(&self) -> bool {
        matches!(self, Operation::Verify | Operation::Reject)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Attach => "attach files to",
            Operation::Delete => "delete",
            Operation::Submit => "submit",
            Operation::Verify => "verify",
            Operation::Reject => "reject",
        };
        f.write_str(verb)
    }
}

/// Why a request was denied. Logged, never sent to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    UnknownRole,
    NotOwner,
    ReviewerRoleRequired,
    NotAdvisorOfOwner,
    AccessDenied,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DenyReason::UnknownRole => "unknown role",
            DenyReason::NotOwner => "not owner",
            DenyReason::ReviewerRoleRequired => "students cannot verify or reject",
            DenyReason::NotAdvisorOfOwner => "not advisor of owner",
            DenyReason::AccessDenied => "access denied",
        };
        f.write_str(reason)
    }
}

/// The actor with its relationship facts already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// `student_id` is `None` when the user has no student profile
    Student { student_id: Option<String> },
    /// Current advisee list, fetched for this call only
    Advisor { advisees: HashSet<String> },
    Admin,
}

/// Facts about the achievement being acted on
#[derive(Debug, Clone, Copy)]
pub struct ResourceFacts<'a> {
    pub owner_student_id: &'a str,
    /// `None` when the resource does not exist yet (create)
    pub status: Option<AchievementStatus>,
}

impl<'a> ResourceFacts<'a> {
    pub fn new(owner_student_id: &'a str, status: Option<AchievementStatus>) -> Self {
        Self {
            owner_student_id,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Deny becomes the operation's terminal `Forbidden` error, unchanged
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(LaurelError::Forbidden(reason)),
        }
    }
}

/// Decide whether `subject` may perform `operation` on `resource`
pub fn decide(operation: Operation, subject: &Subject, resource: &ResourceFacts<'_>) -> Decision {
    match subject {
        Subject::Admin => Decision::Allow,

        Subject::Student { student_id } => {
            let owns = student_id
                .as_deref()
                .is_some_and(|id| id == resource.owner_student_id);
            if !owns {
                Decision::Deny(DenyReason::NotOwner)
            } else if operation.is_review() {
                Decision::Deny(DenyReason::ReviewerRoleRequired)
            } else {
                Decision::Allow
            }
        }

        Subject::Advisor { advisees } => {
            let permitted = matches!(
                operation,
                Operation::Read | Operation::Verify | Operation::Reject
            );
            if permitted && advisees.contains(resource.owner_student_id) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotAdvisorOfOwner)
            }
        }
    }
}
