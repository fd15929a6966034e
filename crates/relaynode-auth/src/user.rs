//! User identity and policy record.

use std::collections::BTreeMap;

use crate::credential::Credential;

/// One principal known to the node.
///
/// The registry only interprets `username` and `password`; `policy` is
/// whatever the controller attached and is handed back untouched.
/// Records are replaced wholesale, never patched field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique business key.
    pub username: String,
    /// Secret paired with `username` to form the credential.
    pub password: String,
    /// Opaque controller-supplied policy fields.
    pub policy: BTreeMap<String, String>,
}

impl UserRecord {
    /// Create a record with no policy fields.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            policy: BTreeMap::new(),
        }
    }

    /// Attach a policy field.
    pub fn with_policy(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.policy.insert(key.into(), value.into());
        self
    }

    /// The registry key for this record.
    #[inline]
    pub fn credential(&self) -> Credential {
        Credential::new(&self.username, &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_follows_password() {
        let a = UserRecord::new("alice", "p1");
        let b = UserRecord::new("alice", "p1").with_policy("speed_limit", "100");
        let c = UserRecord::new("alice", "p2");
        assert_eq!(a.credential(), b.credential());
        assert_ne!(a.credential(), c.credential());
    }
}
