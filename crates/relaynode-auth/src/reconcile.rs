//! Full user-list reconciliation.
//!
//! The controller periodically pushes the complete list of users the node
//! should accept. Reconciliation runs two passes over the registry:
//!
//! 1. **Add**: every pushed user whose credential is not registered yet is
//!    added (creating its traffic record if needed).
//! 2. **Remove**: every registered user whose *username* does not appear in
//!    the pushed list is removed.
//!
//! Each pass is published as one registry batch. Lookups running
//! concurrently may see the adds before the removes.
//!
//! A user whose password changed keeps its old credential under
//! [`StaleCredentialPolicy::Retain`], because the username is still
//! present in the list. [`StaleCredentialPolicy::Evict`] also drops
//! registered credentials that no pushed user maps to.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use relaynode_core::defaults::{STALE_CREDENTIALS_EVICT, STALE_CREDENTIALS_RETAIN};
use tracing::info;

use crate::credential::Credential;
use crate::registry::UserRegistry;
use crate::user::UserRecord;

/// What the remove pass does with credentials of users that are still listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleCredentialPolicy {
    /// Remove by username only; old credentials of listed users survive.
    #[default]
    Retain,
    /// Also remove credentials that no listed user maps to.
    Evict,
}

impl StaleCredentialPolicy {
    /// Config spelling of the policy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => STALE_CREDENTIALS_RETAIN,
            Self::Evict => STALE_CREDENTIALS_EVICT,
        }
    }
}

impl fmt::Display for StaleCredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stale credential policy {0:?} (expected \"retain\" or \"evict\")")]
pub struct ParsePolicyError(String);

impl FromStr for StaleCredentialPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            STALE_CREDENTIALS_RETAIN => Ok(Self::Retain),
            STALE_CREDENTIALS_EVICT => Ok(Self::Evict),
            _ => Err(ParsePolicyError(s.to_owned())),
        }
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Credentials added by the add pass.
    pub added: usize,
    /// Credentials removed by the remove pass.
    pub removed: usize,
}

impl UserRegistry {
    /// Make the registered user set match `target`.
    ///
    /// Runs in O(registered + target): the target list is indexed by
    /// username (and credential, for [`StaleCredentialPolicy::Evict`])
    /// before the passes.
    pub fn sync(&self, target: &[UserRecord], policy: StaleCredentialPolicy) -> SyncReport {
        let listed: Vec<(Credential, &UserRecord)> =
            target.iter().map(|user| (user.credential(), user)).collect();
        let usernames: HashSet<&str> = target.iter().map(|u| u.username.as_str()).collect();
        let credentials: HashSet<&Credential> = match policy {
            StaleCredentialPolicy::Retain => HashSet::new(),
            StaleCredentialPolicy::Evict => listed.iter().map(|(cred, _)| cred).collect(),
        };

        let added = self.batch(|batch| {
            let mut added = 0;
            for (credential, user) in &listed {
                if !batch.contains(credential) {
                    batch.add((*user).clone());
                    added += 1;
                }
            }
            added
        });

        let removed = self.batch(|batch| {
            batch.retain(|credential, user| {
                usernames.contains(user.username.as_str())
                    && (policy == StaleCredentialPolicy::Retain || credentials.contains(credential))
            })
        });

        let report = SyncReport { added, removed };
        info!(
            listed = target.len(),
            added = report.added,
            removed = report.removed,
            registered = self.len(),
            %policy,
            "user list reconciled"
        );
        report
    }
}
