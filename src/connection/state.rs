//! Module `connection`
//!
//! Defines the `Connection` struct and associated methods to manage a client
//! session, including its identifier, peer address, lifecycle state, and the
//! outbound send capability used during broadcasts.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

use crate::error::SendError;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier assigned to an accepted connection.
///
/// IDs are monotonically assigned at accept time and never reused within
/// one process, so they stay collision-free independent of where the
/// connection lives in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one client session.
///
/// `Closed` is terminal; a session never re-enters the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

/// Represents one accepted WebSocket session.
///
/// Cloned into registry snapshots so broadcasts can deliver to every member
/// without holding the registry lock.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    state: SessionState,
    outbound: mpsc::Sender<Message>,
}

impl Connection {
    pub fn new(id: ConnectionId, peer_addr: SocketAddr, outbound: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            peer_addr,
            state: SessionState::Connecting,
            outbound,
        }
    }

    /// Returns the identifier assigned to this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the peer's socket address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Advances the lifecycle state.
    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Enqueues a text frame for delivery to this connection's peer.
    ///
    /// Never blocks: a departed peer or a saturated queue fails immediately
    /// and is reported to the caller, so a stalled recipient cannot stall
    /// the broadcaster.
    pub fn send(&self, payload: &str) -> Result<(), SendError> {
        self.outbound
            .try_send(Message::text(payload))
            .map_err(|e| match e {
                TrySendError::Full(_) => SendError::QueueFull(self.id),
                TrySendError::Closed(_) => SendError::Closed(self.id),
            })
    }
}
