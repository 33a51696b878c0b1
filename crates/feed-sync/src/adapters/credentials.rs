//! In-memory credential holder.

use parking_lot::RwLock;

use crate::domain::AuthToken;
use crate::ports::outbound::CredentialProvider;

/// Credential provider backed by a lock-protected slot.
#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    token: RwLock<Option<AuthToken>>,
}

impl InMemoryCredentials {
    /// Provider holding `token`, if any.
    pub fn new(token: Option<AuthToken>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    /// Provider with a token set.
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self::new(Some(AuthToken::new(token)))
    }

    /// Provider without a token.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replace the token (after a login).
    pub fn set(&self, token: AuthToken) {
        *self.token.write() = Some(token);
    }
}

impl CredentialProvider for InMemoryCredentials {
    fn get(&self) -> Option<AuthToken> {
        self.token.read().clone()
    }

    fn clear(&self) {
        *self.token.write() = None;
    }
}
