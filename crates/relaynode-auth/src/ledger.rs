//! Per-user traffic ledger.
//!
//! Accounts cumulative bytes, last source address and timestamps per
//! username. Records are created when a user first enters the registry and
//! are never removed, so consumed traffic stays accounted after the user
//! is deleted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};

/// Point-in-time copy of one traffic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficSnapshot {
    pub username: String,
    /// Cumulative bytes.
    pub traffic: u64,
    /// Last-seen source address (empty until first usage).
    pub ip: String,
    /// Unix seconds, set once.
    pub created_at: i64,
    /// Unix seconds, last write wins.
    pub updated_at: i64,
}

/// Mutable fields of a record, guarded together so readers never see a
/// counter from one update and an address from another.
#[derive(Debug)]
struct Usage {
    traffic: u64,
    ip: String,
    updated_at: i64,
}

#[derive(Debug)]
struct TrafficEntry {
    created_at: i64,
    usage: Mutex<Usage>,
}

impl TrafficEntry {
    fn new(now: i64) -> Self {
        Self {
            created_at: now,
            usage: Mutex::new(Usage {
                traffic: 0,
                ip: String::new(),
                updated_at: now,
            }),
        }
    }

    fn snapshot(&self, username: &str) -> TrafficSnapshot {
        let usage = self.usage.lock();
        TrafficSnapshot {
            username: username.to_owned(),
            traffic: usage.traffic,
            ip: usage.ip.clone(),
            created_at: self.created_at,
            updated_at: usage.updated_at,
        }
    }
}

/// Thread-safe traffic ledger keyed by username.
///
/// Cloning is cheap and clones share state. The index lock is only held
/// for lookups and inserts; increments lock the single entry they touch.
#[derive(Debug, Clone, Default)]
pub struct TrafficLedger {
    inner: Arc<RwLock<HashMap<String, Arc<TrafficEntry>>>>,
}

impl TrafficLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zeroed record for `username` unless one exists.
    ///
    /// Returns `true` if this call created the record.
    pub fn ensure_record(&self, username: &str) -> bool {
        if self.inner.read().contains_key(username) {
            return false;
        }
        let mut map = self.inner.write();
        // Re-check: another caller may have created it between the locks.
        if map.contains_key(username) {
            return false;
        }
        map.insert(username.to_owned(), Arc::new(TrafficEntry::new(unix_now())));
        true
    }

    /// Add `bytes` to the user's counter and record the source address.
    ///
    /// Returns `false` without recording anything if the user has no record.
    pub fn record_usage(&self, username: &str, bytes: u64, source_addr: &str) -> bool {
        let Some(entry) = self.inner.read().get(username).cloned() else {
            return false;
        };

        let now = unix_now();
        let mut usage = entry.usage.lock();
        usage.traffic = usage.traffic.saturating_add(bytes);
        if usage.ip != source_addr {
            usage.ip.clear();
            usage.ip.push_str(source_addr);
        }
        // Wall clock may step backwards; updated_at must not.
        usage.updated_at = now.max(usage.updated_at).max(entry.created_at);
        true
    }

    /// Copy of a single record.
    pub fn get(&self, username: &str) -> Option<TrafficSnapshot> {
        let entry = self.inner.read().get(username).cloned()?;
        Some(entry.snapshot(username))
    }

    /// Copy every record.
    ///
    /// Each entry is internally consistent; different entries may be read
    /// at slightly different instants.
    pub fn snapshot(&self) -> Vec<TrafficSnapshot> {
        let entries: Vec<(String, Arc<TrafficEntry>)> = self
            .inner
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();

        entries
            .iter()
            .map(|(name, entry)| entry.snapshot(name))
            .collect()
    }

    /// Check whether a record exists for `username`.
    #[inline]
    pub fn contains(&self, username: &str) -> bool {
        self.inner.read().contains_key(username)
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the ledger has no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

fn unix_now() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    i64::try_from(secs).unwrap_or(i64::MAX)
}
