//! User state for relay nodes.
//!
//! This crate holds the node's permitted users and their traffic accounting:
//!
//! - [`UserRegistry`]: credential-keyed users, lock-free lookups for the data plane
//! - [`TrafficLedger`]: per-username byte counters, address and timestamps
//! - [`UserRegistry::sync`]: reconciliation against a full controller list
//! - [`AuthBackend`]: the trait the forwarding path authenticates through
//!
//! # Example
//!
//! ```
//! use relaynode_auth::{AuthBackend, TrafficLedger, UserRecord, UserRegistry, encode_credentials};
//!
//! # async fn example() -> Result<(), relaynode_auth::AuthError> {
//! let registry = UserRegistry::new(TrafficLedger::new());
//! registry.add(UserRecord::new("alice", "secret"));
//!
//! let result = registry.verify(&encode_credentials("alice", "secret")).await?;
//! registry.record_traffic(result.username(), 1024, "203.0.113.7").await?;
//! assert_eq!(registry.ledger().get("alice").unwrap().traffic, 1024);
//! # Ok(())
//! # }
//! ```

mod credential;
mod error;
mod ledger;
mod reconcile;
mod registry;
mod result;
mod traits;
mod user;

pub use credential::{Credential, encode_credentials};
pub use error::AuthError;
pub use ledger::{TrafficLedger, TrafficSnapshot};
pub use reconcile::{ParsePolicyError, StaleCredentialPolicy, SyncReport};
pub use registry::UserRegistry;
pub use result::AuthResult;
pub use traits::AuthBackend;
pub use user::UserRecord;
