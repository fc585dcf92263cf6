//! Keyed session store: one live table snapshot per user identity.
//!
//! Replaces ambient global state with a single owned component accessed
//! through this contract. Single writer per user is assumed; across users
//! the map supports concurrent access with no cross-key interference.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tabchat_engine::Table;

struct Session {
    table: Table,
    touched: Instant,
}

/// User-keyed store of table snapshots with idle-based eviction.
pub struct SessionStore {
    inner: RwLock<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(HashMap::new()) }
    }

    /// Replace the user's snapshot unconditionally. Overwrites silently.
    pub fn put(&self, user: &str, table: Table) {
        let mut map = self.inner.write().expect("session store lock");
        map.insert(user.to_string(), Session { table, touched: Instant::now() });
    }

    /// Current snapshot, or None when the user has never loaded data.
    /// Refreshes the idle clock.
    pub fn get(&self, user: &str) -> Option<Table> {
        let mut map = self.inner.write().expect("session store lock");
        let session = map.get_mut(user)?;
        session.touched = Instant::now();
        Some(session.table.clone())
    }

    /// Remove the user's session. Returns whether one existed, so the
    /// boundary can tell "cleared" from "nothing to clear".
    pub fn clear(&self, user: &str) -> bool {
        let mut map = self.inner.write().expect("session store lock");
        map.remove(user).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("session store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than `max_age`. Returns how many were
    /// evicted. Invoked by the boundary layer; the store never sweeps on
    /// its own.
    pub fn evict_idle(&self, max_age: Duration) -> usize {
        let mut map = self.inner.write().expect("session store lock");
        let before = map.len();
        map.retain(|_, session| session.touched.elapsed() <= max_age);
        let evicted = before - map.len();
        if evicted > 0 {
            log::info!("evicted {evicted} idle session(s)");
        }
        evicted
    }
}
