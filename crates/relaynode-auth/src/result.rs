//! Authentication result types.

use std::sync::Arc;

use crate::user::UserRecord;

/// Result of a successful credential check.
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// The matched user, as registered at lookup time.
    pub user: Arc<UserRecord>,
}

impl AuthResult {
    #[inline]
    pub fn new(user: Arc<UserRecord>) -> Self {
        Self { user }
    }

    /// Username of the matched user, for logging and traffic accounting.
    #[inline]
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Opaque policy value supplied by the controller.
    #[inline]
    pub fn policy(&self, key: &str) -> Option<&str> {
        self.user.policy.get(key).map(String::as_str)
    }
}
