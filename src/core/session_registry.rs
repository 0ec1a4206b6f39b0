//! Session registry enforcing at-most-one-session-per-account
//!
//! This module provides the `SessionRegistry` struct, which tracks which
//! account identifiers currently have an active, validated connection.
//!
//! # Design
//!
//! The registry maps an `AccountId` to the `ConnectionId` that owns the
//! session. Which account a given connection is logged into is held as
//! per-connection state by the connection handler, never read back out of
//! this map, so an account identifier arriving later on the wire is never
//! trusted.
//!
//! # Thread Safety
//!
//! [`SessionRegistry::try_bind`] is the race this design has to close: two
//! connections validating the same account at the same instant must not
//! both succeed. The check-and-insert runs under the DashMap entry lock,
//! making it a single atomic test-and-set across all connections.

use crate::types::{AccountId, ConnectionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Tracks the live connection-to-account bindings
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Map of account identifiers to the connection holding the session
    sessions: DashMap<AccountId, ConnectionId>,
}

impl SessionRegistry {
    /// Create a new empty SessionRegistry
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Atomically bind an account to a connection
    ///
    /// Succeeds only if no session currently exists for the account. The
    /// "check absent, then insert" step is atomic, so of any number of
    /// concurrent attempts for the same account exactly one succeeds.
    ///
    /// # Returns
    ///
    /// `true` if the binding was created, `false` if the account is
    /// already logged in elsewhere.
    pub fn try_bind(&self, id: &AccountId, connection_id: ConnectionId) -> bool {
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(connection_id);
                true
            }
        }
    }

    /// Remove the session for an account, if present
    ///
    /// Idempotent: unbinding an account with no session is a no-op.
    pub fn unbind(&self, id: &AccountId) {
        self.sessions.remove(id);
    }

    /// Remove the session for an account only if it is owned by the given
    /// connection
    ///
    /// Used by the connection handler's drop guard: a guard outliving its
    /// session (the account was already rebound by a newer connection)
    /// must not evict the newer session.
    pub fn unbind_connection(&self, id: &AccountId, connection_id: ConnectionId) {
        self.sessions
            .remove_if(id, |_, owner| *owner == connection_id);
    }

    /// True if the account currently has an active session
    pub fn is_bound(&self, id: &AccountId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of active sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True if no sessions are active
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    #[test]
    fn test_bind_then_rebind_fails() {
        let registry = SessionRegistry::new();
        let id = account("ab-12345");

        assert!(registry.try_bind(&id, 1));
        assert!(registry.is_bound(&id));

        // Second connection, same account.
        assert!(!registry.try_bind(&id, 2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_bind_is_per_account() {
        let registry = SessionRegistry::new();

        assert!(registry.try_bind(&account("ab-12345"), 1));
        assert!(registry.try_bind(&account("cd-67890"), 2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bind_is_case_insensitive() {
        let registry = SessionRegistry::new();

        assert!(registry.try_bind(&account("ab-12345"), 1));
        assert!(!registry.try_bind(&account("AB-12345"), 2));
    }

    #[test]
    fn test_unbind_is_idempotent() {
        let registry = SessionRegistry::new();
        let id = account("ab-12345");

        registry.try_bind(&id, 1);
        registry.unbind(&id);
        assert!(!registry.is_bound(&id));

        // No session present, still fine.
        registry.unbind(&id);
        assert!(registry.is_empty());

        // The account is free for a new login.
        assert!(registry.try_bind(&id, 2));
    }

    #[test]
    fn test_unbind_connection_ignores_stale_owner() {
        let registry = SessionRegistry::new();
        let id = account("ab-12345");

        registry.try_bind(&id, 1);
        registry.unbind(&id);
        registry.try_bind(&id, 2);

        // Connection 1's guard fires late; connection 2's session survives.
        registry.unbind_connection(&id, 1);
        assert!(registry.is_bound(&id));

        registry.unbind_connection(&id, 2);
        assert!(!registry.is_bound(&id));
    }

    #[test]
    fn test_concurrent_binds_yield_exactly_one_winner() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let registry = Arc::new(SessionRegistry::new());
        let id = account("ab-12345");
        let wins = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|connection_id| {
                let registry = Arc::clone(&registry);
                let wins = Arc::clone(&wins);
                let id = id.clone();
                std::thread::spawn(move || {
                    if registry.try_bind(&id, connection_id) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(registry.is_bound(&id));
    }
}
