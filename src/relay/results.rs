//! Relay result types
//!
//! Defines result structures returned by broadcast operations.

use crate::connection::ConnectionId;
use crate::error::SendError;

/// Outcome of relaying one payload to a registry snapshot.
#[derive(Debug)]
pub struct BroadcastOutcome {
    /// Recipients the payload was handed to.
    pub delivered: usize,
    /// Recipients that could not be reached, with the reason.
    pub failed: Vec<(ConnectionId, SendError)>,
}

impl BroadcastOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
