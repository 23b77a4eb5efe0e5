//! Session endpoints
//!
//! - `POST /api/v1/auth/logout` - Revoke the presented token until it expires
//!
//! Token issuance belongs to the identity service; only revocation lives here.

use hyper::StatusCode;
use tracing::info;

use crate::auth::{Claims, RevocationList};
use crate::routes::response::{success_response, FullBody};

pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Revoke `token`. The caller has already verified it and extracted `claims`.
pub fn handle_logout(
    revocations: &RevocationList,
    token: &str,
    claims: &Claims,
) -> hyper::Response<FullBody> {
    revocations.revoke(token, claims.exp);
    info!("User {} logged out", claims.user_id);

    success_response(
        StatusCode::OK,
        "Logged out successfully",
        serde_json::Value::Null,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logout_revokes_until_expiry() {
        let revocations = RevocationList::new();
        let claims = Claims {
            user_id: "u-1".into(),
            username: "dina".into(),
            role: "Student".into(),
            iat: 100,
            exp: 4_000,
        };

        let response = handle_logout(&revocations, "tok", &claims);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(revocations.is_revoked_at("tok", 3_999));
        assert!(!revocations.is_revoked_at("tok", 4_000));
    }
}
