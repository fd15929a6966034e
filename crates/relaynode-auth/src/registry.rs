//! Concurrent user registry.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::AuthError;
use crate::ledger::TrafficLedger;
use crate::result::AuthResult;
use crate::traits::AuthBackend;
use crate::user::UserRecord;

type UserMap = HashMap<Credential, Arc<UserRecord>>;

/// Credential-keyed set of permitted users.
///
/// Reads go through an `ArcSwap` snapshot and never block. Writers are
/// serialized, copy the current map, apply their changes and publish the
/// result in one store, so a batch of mutations becomes visible at once.
/// Cloning is cheap and clones share state.
///
/// Every write copies the whole map, so a single add, update or delete
/// costs O(registered users) allocations. Writers are expected to be
/// occasional controller calls; use [`UserRegistry::sync`] to apply many
/// changes in one copy.
#[derive(Clone)]
pub struct UserRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    users: ArcSwap<UserMap>,
    writer: Mutex<()>,
    ledger: TrafficLedger,
}

impl UserRegistry {
    /// Create an empty registry that creates traffic records in `ledger`.
    pub fn new(ledger: TrafficLedger) -> Self {
        Self {
            inner: Arc::new(Inner {
                users: ArcSwap::from_pointee(UserMap::new()),
                writer: Mutex::new(()),
                ledger,
            }),
        }
    }

    /// The ledger this registry feeds.
    #[inline]
    pub fn ledger(&self) -> &TrafficLedger {
        &self.inner.ledger
    }

    /// Insert or overwrite `user`, creating its traffic record if missing.
    pub fn add(&self, user: UserRecord) {
        self.batch(|b| b.add(user));
    }

    /// Insert or overwrite `user` without touching the ledger.
    ///
    /// A changed password yields a new credential; the entry under the old
    /// credential stays until it is deleted or reconciled away.
    pub fn update(&self, user: UserRecord) {
        self.batch(|b| b.update(user));
    }

    /// Remove the entry at `user`'s credential. Returns whether one existed.
    pub fn delete(&self, user: &UserRecord) -> bool {
        self.batch(|b| b.delete(&user.credential()))
    }

    /// Look a user up by the encoded credential the data plane presents.
    #[inline]
    pub fn lookup(&self, credential: &str) -> Option<Arc<UserRecord>> {
        self.inner.users.load().get(credential).cloned()
    }

    /// Check whether `credential` is registered.
    #[inline]
    pub fn contains(&self, credential: &str) -> bool {
        self.inner.users.load().contains_key(credential)
    }

    /// Number of registered credentials.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.users.load().len()
    }

    /// Check if no users are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.users.load().is_empty()
    }

    /// All registered users, in no particular order.
    pub fn users(&self) -> Vec<Arc<UserRecord>> {
        self.inner.users.load().values().cloned().collect()
    }

    /// Apply several mutations and publish them together.
    pub(crate) fn batch<R>(&self, f: impl FnOnce(&mut Batch<'_>) -> R) -> R {
        let _writer = self.inner.writer.lock();
        let mut batch = Batch {
            users: UserMap::clone(&self.inner.users.load()),
            ledger: &self.inner.ledger,
            dirty: false,
        };
        let result = f(&mut batch);
        if batch.dirty {
            self.inner.users.store(Arc::new(batch.users));
        }
        result
    }
}

// Cannot derive Debug through ArcSwap without printing every user
impl std::fmt::Debug for UserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegistry")
            .field("users", &self.len())
            .field("ledger", &self.inner.ledger.len())
            .finish()
    }
}

/// Private working copy of the user map, held under the writer lock.
pub(crate) struct Batch<'a> {
    users: UserMap,
    ledger: &'a TrafficLedger,
    dirty: bool,
}

impl Batch<'_> {
    pub(crate) fn add(&mut self, user: UserRecord) {
        if self.ledger.ensure_record(&user.username) {
            debug!(username = %user.username, "traffic record created");
        }
        self.update(user);
    }

    pub(crate) fn update(&mut self, user: UserRecord) {
        debug!(username = %user.username, "user stored");
        self.users.insert(user.credential(), Arc::new(user));
        self.dirty = true;
    }

    pub(crate) fn delete(&mut self, credential: &Credential) -> bool {
        match self.users.remove(credential) {
            Some(user) => {
                debug!(username = %user.username, "user removed");
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, credential: &Credential) -> bool {
        self.users.contains_key(credential)
    }

    /// Keep only entries for which `keep` returns true; returns the number removed.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&Credential, &UserRecord) -> bool) -> usize {
        let before = self.users.len();
        self.users.retain(|credential, user| {
            let kept = keep(credential, user);
            if !kept {
                debug!(username = %user.username, "user removed");
            }
            kept
        });
        let removed = before - self.users.len();
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }
}

#[async_trait]
impl AuthBackend for UserRegistry {
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        self.lookup(credential)
            .map(AuthResult::new)
            .ok_or(AuthError::Invalid)
    }

    async fn record_traffic(&self, username: &str, bytes: u64, peer: &str) -> Result<(), AuthError> {
        if self.inner.ledger.record_usage(username, bytes, peer) {
            Ok(())
        } else {
            warn!(username, bytes, "usage reported for user without traffic record");
            Err(AuthError::NotFound(username.to_owned()))
        }
    }
}
