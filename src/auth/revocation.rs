//! Revoked token set
//!
//! Tokens revoked at logout are remembered until their own expiry. Entries
//! are removed lazily when a lookup finds them expired; there is no sweeper
//! task. The set is process-local and empty after restart, which is
//! acceptable because every revoked token also expires on its own.
//!
//! Constructed once at startup and shared through `AppState`.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::auth::jwt::unix_now;

/// Set of revoked tokens, keyed by the raw token string
#[derive(Debug, Default)]
pub struct RevocationList {
    /// token -> expiry (Unix seconds)
    entries: RwLock<HashMap<String, u64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke `token` until `expires_at` (Unix seconds)
    pub fn revoke(&self, token: &str, expires_at: u64) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(token.to_string(), expires_at);
        debug!("Token revoked until {} ({} revoked)", expires_at, entries.len());
    }

    /// Whether `token` is currently revoked
    pub fn is_revoked(&self, token: &str) -> bool {
        // A clock error means we cannot prove expiry; keep the entry.
        let now = unix_now().unwrap_or(0);
        self.is_revoked_at(token, now)
    }

    /// Lookup against an explicit clock. Expired entries are dropped.
    pub fn is_revoked_at(&self, token: &str, now: u64) -> bool {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(token) {
                None => return false,
                Some(&expires_at) if now < expires_at => return true,
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have re-revoked with a later expiry meanwhile
        match entries.get(token) {
            Some(&expires_at) if now < expires_at => true,
            Some(_) => {
                entries.remove(token);
                false
            }
            None => false,
        }
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
