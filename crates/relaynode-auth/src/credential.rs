//! Credential derivation.

use std::borrow::Borrow;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Registry key derived from a `(username, password)` pair.
///
/// This is the base64 form of `username:password`, the same token a
/// Basic/SOCKS5 data plane builds from the client's credentials, so the
/// data plane can look users up without knowing the password scheme.
/// It is an identity key, not a secret: the encoding is reversible.
///
/// Distinct pairs map to distinct keys as long as usernames do not
/// contain `:` (RFC 7617 forbids it in a user-id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Credential(String);

impl Credential {
    /// Derive the credential for a username/password pair.
    pub fn new(username: &str, password: &str) -> Self {
        let mut raw = String::with_capacity(username.len() + password.len() + 1);
        raw.push_str(username);
        raw.push(':');
        raw.push_str(password);
        Self(STANDARD.encode(raw))
    }

    /// Wrap an already-encoded token received from the data plane.
    #[inline]
    pub fn from_encoded(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The encoded token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Credential {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Credential {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode credentials as the data plane presents them.
///
/// # Example
/// ```
/// use relaynode_auth::encode_credentials;
///
/// assert_eq!(encode_credentials("alice", "p1"), "YWxpY2U6cDE=");
/// ```
#[inline]
pub fn encode_credentials(username: &str, password: &str) -> String {
    Credential::new(username, password).0
}
