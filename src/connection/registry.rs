//! Connection registry
//!
//! Tracks the set of live connections and hands out snapshots for
//! broadcasting. A connection is a member exactly while its session handler
//! is between registration and deregistration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::connection::state::{Connection, ConnectionId};

/// Registry for tracking active connections
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

/// Registry shared between the accept loop and every session handler.
///
/// All membership changes and snapshot copies happen under this lock; the
/// lock is never held across an await point.
pub type SharedRegistry = Arc<Mutex<ConnectionRegistry>>;

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Adds a connection. No-op if the identifier is already present.
    pub fn register(&mut self, conn: Connection) {
        self.connections.entry(conn.id()).or_insert(conn);
    }

    /// Removes a connection. No-op if absent, so cleanup paths that race
    /// with an explicit close can both run safely.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    /// Copies the current membership out for iteration outside the lock.
    pub fn snapshot(&self) -> Vec<Connection> {
        self.connections.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
