//! Admin sessions and the authorization context.
//!
//! There is no ambient session state: every store or import call receives
//! an explicit [`AuthContext`], and the callee itself decides whether the
//! operation is allowed. The HTTP layer builds the context from a bearer
//! token; the CLI acts as the local operator and builds an admin context
//! directly.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Proof of who is calling. Cheap to copy, passed by value or reference
/// into every operation that cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    admin: bool,
}

impl AuthContext {
    /// An authenticated admin (validated session or local operator).
    pub fn admin() -> Self {
        Self { admin: true }
    }

    /// An unauthenticated caller; read operations only.
    pub fn anonymous() -> Self {
        Self { admin: false }
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Hex-encoded SHA-256 of a password, for comparison against the
/// configured digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory set of live admin session tokens.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashSet<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the password against the configured digest and mint a new
    /// session token. Returns `None` on a wrong password.
    pub async fn login(&self, password: &str, expected_digest: &str) -> Option<String> {
        if !sha256_hex(password).eq_ignore_ascii_case(expected_digest) {
            return None;
        }

        let token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        Some(token)
    }

    /// Revoke a session token. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }

    /// Build the authorization context for a request.
    pub async fn context_for(&self, token: Option<&str>) -> AuthContext {
        match token {
            Some(t) if self.tokens.read().await.contains(t) => AuthContext::admin(),
            _ => AuthContext::anonymous(),
        }
    }
}
