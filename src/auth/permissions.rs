//! Route-level permission gate
//!
//! Coarse check run before a request reaches the lifecycle manager: does the
//! caller's role carry the permission string an endpoint requires? Passing
//! this gate says nothing about whether the caller may touch a particular
//! achievement; that is decided per resource by [`crate::auth::evaluator`].

pub const ACHIEVEMENT_CREATE: &str = "achievement:create";
pub const ACHIEVEMENT_READ: &str = "achievement:read";
pub const ACHIEVEMENT_UPDATE: &str = "achievement:update";
pub const ACHIEVEMENT_DELETE: &str = "achievement:delete";
pub const ACHIEVEMENT_VERIFY: &str = "achievement:verify";

/// Endpoints under `/api/v1/achievements`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Create,
    List,
    Get,
    Update,
    Delete,
    Attach,
    Submit,
    Verify,
    Reject,
    History,
}

/// Permission string an endpoint requires
pub fn required_permission(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Create => ACHIEVEMENT_CREATE,

        Endpoint::List | Endpoint::Get | Endpoint::History => ACHIEVEMENT_READ,

        // Submitting and attaching are edits of the caller's own draft
        Endpoint::Update | Endpoint::Attach | Endpoint::Submit => ACHIEVEMENT_UPDATE,

        Endpoint::Delete => ACHIEVEMENT_DELETE,

        Endpoint::Verify | Endpoint::Reject => ACHIEVEMENT_VERIFY,
    }
}

/// Check whether `granted` contains the permission `endpoint` requires
pub fn is_endpoint_allowed<S: AsRef<str>>(endpoint: Endpoint, granted: &[S]) -> bool {
    let required = required_permission(endpoint);
    granted.iter().any(|p| p.as_ref() == required)
}

/// Human-readable description of an endpoint for logging
pub fn endpoint_description(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Create => "Create achievement",
        Endpoint::List => "List achievements",
        Endpoint::Get => "Get achievement",
        Endpoint::Update => "Update achievement",
        Endpoint::Delete => "Delete achievement",
        Endpoint::Attach => "Add attachment",
        Endpoint::Submit => "Submit for verification",
        Endpoint::Verify => "Verify achievement",
        Endpoint::Reject => "Reject achievement",
        Endpoint::History => "Get status history",
    }
}
