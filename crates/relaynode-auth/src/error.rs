//! Authentication error types.

/// Error returned to the data plane.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No registered user matches the presented credential.
    #[error("invalid credential")]
    Invalid,

    /// Usage was reported for a username with no traffic record.
    #[error("no traffic record for user {0:?}")]
    NotFound(String),
}
