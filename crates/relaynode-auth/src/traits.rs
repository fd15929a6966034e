//! Data-plane authentication trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::result::AuthResult;

/// Seam between the forwarding path and the user state.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are called
/// concurrently from every proxied connection.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolve an encoded credential (see [`crate::encode_credentials`]).
    ///
    /// # Returns
    /// * `Ok(AuthResult)` - the credential belongs to a registered user
    /// * `Err(AuthError::Invalid)` - no user matches
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError>;

    /// Account `bytes` of traffic from `peer` to `username`.
    ///
    /// # Returns
    /// * `Err(AuthError::NotFound)` - the user never had a traffic record
    async fn record_traffic(&self, username: &str, bytes: u64, peer: &str) -> Result<(), AuthError>;
}

/// Blanket implementation for `Arc<A>` where `A: AuthBackend`.
#[async_trait]
impl<A: AuthBackend + ?Sized> AuthBackend for Arc<A> {
    #[inline]
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        (**self).verify(credential).await
    }

    #[inline]
    async fn record_traffic(&self, username: &str, bytes: u64, peer: &str) -> Result<(), AuthError> {
        (**self).record_traffic(username, bytes, peer).await
    }
}

/// Blanket implementation for `Box<A>` where `A: AuthBackend`.
#[async_trait]
impl<A: AuthBackend + ?Sized> AuthBackend for Box<A> {
    #[inline]
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        (**self).verify(credential).await
    }

    #[inline]
    async fn record_traffic(&self, username: &str, bytes: u64, peer: &str) -> Result<(), AuthError> {
        (**self).record_traffic(username, bytes, peer).await
    }
}
