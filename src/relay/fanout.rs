//! Broadcast fan-out
//!
//! Relays one payload to every connection in a registry snapshot with
//! per-recipient failure containment.

use log::warn;

use crate::connection::Connection;
use crate::relay::results::BroadcastOutcome;

/// Sends `payload` to every connection in `snapshot`, sender included.
///
/// A failed send is recorded in the outcome and never aborts delivery to
/// the remaining recipients; the unreachable recipient's own session
/// handler detects the closure and cleans up independently.
pub fn broadcast(snapshot: &[Connection], payload: &str) -> BroadcastOutcome {
    let mut outcome = BroadcastOutcome {
        delivered: 0,
        failed: Vec::new(),
    };

    for conn in snapshot {
        match conn.send(payload) {
            Ok(()) => outcome.delivered += 1,
            Err(e) => {
                warn!("Failed to relay to client {}: {}", conn.id(), e);
                outcome.failed.push((conn.id(), e));
            }
        }
    }

    outcome
}
